//! A concentrated-liquidity pool as seen by the agents.
//!
//! The pool keeps local mirrors of its price, tick and positions; every
//! value-moving effect goes through the [`Ledger`] passed to each call.
//! Agent-facing amounts are human units, converted to 18-decimal raw
//! amounts at the ledger boundary.

use crate::error::{SimulationError, SimulationResult};
use crate::metrics::{MetricsCollector, StepRecord};
use crate::registry::PositionRegistry;
use primitive_types::U256;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::{debug, info, warn};
use unisim_domain::fees::FeeTier;
use unisim_domain::math::full_math::to_u128;
use unisim_domain::math::tick_math::{
    price_to_sqrt_price_x96, sqrt_price_x96_to_inverse_price, sqrt_price_x96_to_price,
};
use unisim_domain::position::{Position, PositionId};
use unisim_domain::token::Token;
use unisim_domain::value_objects::{Amount, Price, PriceRange};
use unisim_ledger::{Address, Ledger, LedgerError, OpenPosition, SwapRequest};

/// Token pair, fee tier and live state of one deployed pool.
#[derive(Debug, Clone)]
pub struct Pool {
    name: String,
    address: Address,
    token0: Address,
    token1: Address,
    fee: FeeTier,
    sqrt_price_x96: U256,
    current_tick: i32,
    positions: PositionRegistry,
    metrics: MetricsCollector,
}

impl Pool {
    /// Name a pool built from these arguments would get, e.g. `DIA_USDC_500`.
    #[must_use]
    pub fn name_for(token_a: &Token, token_b: &Token, fee: u32) -> String {
        format!("{}_{}_{}", token_a.symbol, token_b.symbol, fee)
    }

    /// Deploys both tokens and the pool, initialised at
    /// `token_b.initial_price / token_a.initial_price`.
    ///
    /// Token addresses are sorted; when the second deployment sorts first
    /// the symbols are swapped so that token0 always carries `token_a`'s
    /// symbol.
    pub fn new(
        ledger: &mut impl Ledger,
        token_a: &Token,
        token_b: &Token,
        fee: u32,
        deployer: Address,
    ) -> SimulationResult<Self> {
        let tier = FeeTier::from_pips(fee).map_err(|_| SimulationError::InvalidFeeTier(fee))?;
        if !token_b.is_quote() {
            return Err(SimulationError::InvalidTokenOrdering {
                symbol: token_b.symbol.clone(),
                price: token_b.initial_price,
            });
        }
        let price_a = Price::new(token_a.initial_price)?.to_f64()?;
        let price_b = Price::new(token_b.initial_price)?.to_f64()?;
        let sqrt_price_x96 = price_to_sqrt_price_x96(price_b / price_a)?;

        let a = ledger.deploy_token(&token_a.symbol, deployer)?;
        let b = ledger.deploy_token(&token_b.symbol, deployer)?;
        let (token0, token1) = if a < b {
            (a, b)
        } else {
            ledger.rename_token(b, &token_a.symbol, deployer)?;
            ledger.rename_token(a, &token_b.symbol, deployer)?;
            (b, a)
        };

        let address = ledger.create_pool(token0, token1, tier.pips(), sqrt_price_x96, deployer)?;
        let slot = ledger.pool_state(address)?;
        let name = Self::name_for(token_a, token_b, fee);
        info!(
            pool = %name,
            address = ?address,
            tick = slot.tick,
            sqrt_price_x96 = %slot.sqrt_price_x96,
            "pool deployed"
        );

        Ok(Self {
            name,
            address,
            token0,
            token1,
            fee: tier,
            sqrt_price_x96: slot.sqrt_price_x96,
            current_tick: slot.tick,
            positions: PositionRegistry::new(),
            metrics: MetricsCollector::new(token_a.symbol.clone(), token_b.symbol.clone()),
        })
    }

    /// Canonical `SYMBOL0_SYMBOL1_FEE` name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ledger address of the deployed pool.
    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    /// Lower-addressed token.
    #[must_use]
    pub fn token0(&self) -> Address {
        self.token0
    }

    /// Higher-addressed token.
    #[must_use]
    pub fn token1(&self) -> Address {
        self.token1
    }

    #[must_use]
    pub fn fee(&self) -> FeeTier {
        self.fee
    }

    /// Spacing implied by the fee tier.
    #[must_use]
    pub fn tick_spacing(&self) -> i32 {
        self.fee.tick_spacing()
    }

    /// Price as of the last operation through this pool.
    #[must_use]
    pub fn sqrt_price_x96(&self) -> U256 {
        self.sqrt_price_x96
    }

    /// Tick as of the last operation through this pool.
    #[must_use]
    pub fn current_tick(&self) -> i32 {
        self.current_tick
    }

    /// Mirror of the positions minted through this pool.
    #[must_use]
    pub fn positions(&self) -> &PositionRegistry {
        &self.positions
    }

    #[must_use]
    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    /// Step records collected so far.
    #[must_use]
    pub fn records(&self) -> &[StepRecord] {
        self.metrics.records()
    }

    /// Live `(sqrt_price_x96, tick)` read from the ledger.
    pub fn sqrt_price_tick(&self, ledger: &impl Ledger) -> SimulationResult<(U256, i32)> {
        let slot = ledger.pool_state(self.address)?;
        Ok((slot.sqrt_price_x96, slot.tick))
    }

    /// `(price of token0 in token1, price of token1 in token0)`.
    pub fn exchange_prices(&self) -> SimulationResult<(f64, f64)> {
        let price1 = sqrt_price_x96_to_price(self.sqrt_price_x96)?;
        let price0 = sqrt_price_x96_to_inverse_price(self.sqrt_price_x96)?;
        Ok((price0, price1))
    }

    /// Mints both tokens to `owner`.
    pub fn mint_tokens(
        &self,
        ledger: &mut impl Ledger,
        amount0: Decimal,
        amount1: Decimal,
        owner: Address,
    ) -> SimulationResult<()> {
        let raw0 = Amount::from_tokens(amount0)?.raw;
        let raw1 = Amount::from_tokens(amount1)?.raw;
        ledger.mint(self.token0, owner, raw0)?;
        ledger.mint(self.token1, owner, raw1)?;
        debug!(pool = %self.name, owner = ?owner, %amount0, %amount1, "minted tokens");
        Ok(())
    }

    /// Burns tokens held by `owner`. Each side is skipped when its amount is
    /// zero or exceeds the balance.
    pub fn burn_tokens(
        &self,
        ledger: &mut impl Ledger,
        amount0: Decimal,
        amount1: Decimal,
        owner: Address,
    ) -> SimulationResult<()> {
        for (token, amount) in [(self.token0, amount0), (self.token1, amount1)] {
            let raw = Amount::from_tokens(amount)?.raw;
            if raw.is_zero() {
                continue;
            }
            if ledger.balance_of(token, owner)? < raw {
                warn!(pool = %self.name, owner = ?owner, %amount, "burn skipped, balance too low");
                continue;
            }
            ledger.burn(token, owner, raw)?;
        }
        Ok(())
    }

    /// Balances of both tokens held by `owner`, in token units.
    pub fn pair_balance(
        &self,
        ledger: &impl Ledger,
        owner: Address,
    ) -> SimulationResult<(Decimal, Decimal)> {
        let bal0 = Amount::from_raw(ledger.balance_of(self.token0, owner)?).to_decimal()?;
        let bal1 = Amount::from_raw(ledger.balance_of(self.token1, owner)?).to_decimal()?;
        Ok((bal0, bal1))
    }

    /// Token balances held by the pool itself.
    pub fn reserves(&self, ledger: &impl Ledger) -> SimulationResult<(Decimal, Decimal)> {
        self.pair_balance(ledger, self.address)
    }

    /// Opens a position over an agent-facing price band (token0 quoted in
    /// token1) and returns `(used0, used1, id)` with raw amounts.
    pub fn mint_position(
        &mut self,
        ledger: &mut impl Ledger,
        amount0: Decimal,
        amount1: Decimal,
        price_low: Decimal,
        price_high: Decimal,
        owner: Address,
    ) -> SimulationResult<(U256, U256, PositionId)> {
        let (bal0, bal1) = self.pair_balance(ledger, owner)?;
        ensure_balance(amount0, bal0)?;
        ensure_balance(amount1, bal1)?;

        let range = PriceRange::new(Price::new(price_low)?, Price::new(price_high)?);
        let (tick_lower, tick_upper) = range.to_ticks(self.tick_spacing())?;

        let raw0 = Amount::from_tokens(amount0)?.raw;
        let raw1 = Amount::from_tokens(amount1)?.raw;
        let manager = ledger.position_manager();
        ledger.approve(self.token0, owner, manager, raw0)?;
        ledger.approve(self.token1, owner, manager, raw1)?;

        let outcome = ledger.open_position(
            OpenPosition {
                token0: self.token0,
                token1: self.token1,
                fee: self.fee.pips(),
                tick_lower,
                tick_upper,
                amount0_desired: raw0,
                amount1_desired: raw1,
                recipient: owner,
            },
            owner,
        )?;

        self.positions.insert(Position::new(
            outcome.id,
            tick_lower,
            tick_upper,
            outcome.liquidity,
        ));
        self.refresh(ledger)?;
        info!(
            pool = %self.name,
            id = outcome.id,
            tick_lower,
            tick_upper,
            liquidity = outcome.liquidity,
            "position minted"
        );
        Ok((outcome.amount0, outcome.amount1, outcome.id))
    }

    /// `(fee, tick_lower, tick_upper, liquidity)` of a position.
    pub fn get_position(
        &self,
        ledger: &impl Ledger,
        id: PositionId,
    ) -> SimulationResult<(u32, i32, i32, u128)> {
        let state = ledger.position_state(id)?;
        Ok((state.fee, state.tick_lower, state.tick_upper, state.liquidity))
    }

    /// Adds to an existing position. Returns the liquidity added and the raw
    /// amounts used.
    pub fn increase_liquidity(
        &mut self,
        ledger: &mut impl Ledger,
        id: PositionId,
        amount0: Decimal,
        amount1: Decimal,
        owner: Address,
    ) -> SimulationResult<(u128, U256, U256)> {
        let raw0 = Amount::from_tokens(amount0)?.raw;
        let raw1 = Amount::from_tokens(amount1)?.raw;
        let manager = ledger.position_manager();
        ledger.approve(self.token0, owner, manager, raw0)?;
        ledger.approve(self.token1, owner, manager, raw1)?;

        let change = ledger.increase_position(id, raw0, raw1, owner)?;
        self.sync_position(ledger, id)?;
        debug!(pool = %self.name, id, added = change.liquidity, "liquidity increased");
        Ok((change.liquidity, change.amount0, change.amount1))
    }

    /// Withdraws `fraction` of a position's liquidity, rounded down, and
    /// collects everything owed to `owner`. A fraction that rounds to zero
    /// liquidity returns `(0, 0)` without touching the ledger, but only for
    /// the position's owner.
    pub fn remove_liquidity(
        &mut self,
        ledger: &mut impl Ledger,
        id: PositionId,
        fraction: Decimal,
        owner: Address,
    ) -> SimulationResult<(U256, U256)> {
        if fraction <= Decimal::ZERO || fraction > Decimal::ONE {
            return Err(SimulationError::InvalidFraction(fraction));
        }
        let state = ledger.position_state(id)?;
        if state.owner != owner {
            return Err(LedgerError::NotOwner { id, caller: owner }.into());
        }
        let delta = scale_liquidity(state.liquidity, fraction)?;
        if delta == 0 {
            warn!(pool = %self.name, id, %fraction, "nothing to remove");
            return Ok((U256::zero(), U256::zero()));
        }

        ledger.decrease_position(id, delta, owner)?;
        let collected = ledger.collect_owed(id, owner, owner)?;
        self.sync_position(ledger, id)?;
        debug!(
            pool = %self.name,
            id,
            removed = delta,
            amount0 = %collected.0,
            amount1 = %collected.1,
            "liquidity removed"
        );
        Ok(collected)
    }

    /// Sells `amount` of token0 for token1. Returns raw `(in, out)`.
    pub fn swap_0_for_1(
        &mut self,
        ledger: &mut impl Ledger,
        amount: Decimal,
        trader: Address,
    ) -> SimulationResult<(U256, U256)> {
        let (bal0, _) = self.pair_balance(ledger, trader)?;
        ensure_balance(amount, bal0)?;
        let (amount_in, amount_out) = self.swap(ledger, self.token0, self.token1, amount, trader)?;
        self.metrics.add_volume(amount_in, amount_out);
        Ok((amount_in, amount_out))
    }

    /// Sells `amount` of token1 for token0. Returns raw `(in, out)`.
    pub fn swap_1_for_0(
        &mut self,
        ledger: &mut impl Ledger,
        amount: Decimal,
        trader: Address,
    ) -> SimulationResult<(U256, U256)> {
        let (_, bal1) = self.pair_balance(ledger, trader)?;
        ensure_balance(amount, bal1)?;
        let (amount_in, amount_out) = self.swap(ledger, self.token1, self.token0, amount, trader)?;
        self.metrics.add_volume(amount_out, amount_in);
        Ok((amount_in, amount_out))
    }

    /// Appends this step's observation and resets the step volume.
    pub fn collect_data(&mut self, ledger: &impl Ledger, step: u64) -> SimulationResult<()> {
        self.refresh(ledger)?;
        let prices = self.exchange_prices()?;
        let reserves = self.reserves(ledger)?;
        let record = self
            .metrics
            .record(step, self.current_tick, prices, reserves)?;
        debug!(
            pool = %self.name,
            step,
            tick = record.tick,
            reserve0 = %record.reserve0,
            reserve1 = %record.reserve1,
            "step recorded"
        );
        Ok(())
    }

    fn swap(
        &mut self,
        ledger: &mut impl Ledger,
        token_in: Address,
        token_out: Address,
        amount: Decimal,
        trader: Address,
    ) -> SimulationResult<(U256, U256)> {
        let amount_in = Amount::from_tokens(amount)?.raw;
        let router = ledger.router();
        ledger.approve(token_in, trader, router, amount_in)?;

        let amount_out = ledger.swap_exact_in(
            SwapRequest {
                token_in,
                token_out,
                fee: self.fee.pips(),
                recipient: trader,
                amount_in,
            },
            trader,
        )?;
        self.refresh(ledger)?;
        debug!(
            pool = %self.name,
            trader = ?trader,
            %amount_in,
            %amount_out,
            tick = self.current_tick,
            "swap"
        );
        Ok((amount_in, amount_out))
    }

    fn refresh(&mut self, ledger: &impl Ledger) -> SimulationResult<()> {
        let (sqrt_price_x96, tick) = self.sqrt_price_tick(ledger)?;
        self.sqrt_price_x96 = sqrt_price_x96;
        self.current_tick = tick;
        Ok(())
    }

    fn sync_position(&mut self, ledger: &impl Ledger, id: PositionId) -> SimulationResult<()> {
        let state = ledger.position_state(id)?;
        let owed = (state.tokens_owed0, state.tokens_owed1);
        if !self.positions.update(id, state.liquidity, owed) {
            let mut position =
                Position::new(id, state.tick_lower, state.tick_upper, state.liquidity);
            (position.owed0, position.owed1) = owed;
            self.positions.insert(position);
        }
        self.refresh(ledger)
    }
}

fn ensure_balance(needed: Decimal, available: Decimal) -> SimulationResult<()> {
    if available < needed {
        return Err(SimulationError::InsufficientBalance { needed, available });
    }
    Ok(())
}

/// `floor(liquidity * fraction)` computed exactly.
fn scale_liquidity(liquidity: u128, fraction: Decimal) -> SimulationResult<u128> {
    let mantissa = fraction
        .mantissa()
        .to_u128()
        .ok_or_else(|| SimulationError::InvalidFraction(fraction))?;
    let scaled = U256::from(liquidity) * U256::from(mantissa) / U256::exp10(fraction.scale() as usize);
    Ok(to_u128(scaled)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use unisim_domain::math::tick_math::MIN_SQRT_RATIO;
    use unisim_ledger::InMemoryLedger;

    fn raw(s: &str) -> U256 {
        U256::from_dec_str(s).unwrap()
    }

    fn ether(n: u64) -> U256 {
        U256::from(n) * U256::exp10(18)
    }

    fn setup(a: Token, b: Token) -> (InMemoryLedger, Pool, Address) {
        let mut ledger = InMemoryLedger::new();
        let deployer = ledger.create_account();
        let pool = Pool::new(&mut ledger, &a, &b, 500, deployer).unwrap();
        (ledger, pool, deployer)
    }

    fn usdc_weth() -> (InMemoryLedger, Pool, Address) {
        setup(Token::new("USDC", dec!(3300)), Token::new("WETH", dec!(1)))
    }

    fn dia_usdc() -> (InMemoryLedger, Pool, Address) {
        setup(Token::new("DIA", dec!(1)), Token::new("USDC", dec!(1)))
    }

    #[test]
    fn test_sorts_addresses_and_keeps_symbols() {
        for seed in 0..8u64 {
            let mut ledger = InMemoryLedger::with_seed(seed);
            let deployer = ledger.create_account();
            let pool = Pool::new(
                &mut ledger,
                &Token::new("USDC", dec!(3300)),
                &Token::new("WETH", dec!(1)),
                500,
                deployer,
            )
            .unwrap();
            assert!(pool.token0() < pool.token1());
            assert_eq!(ledger.symbol(pool.token0()).unwrap(), "USDC");
            assert_eq!(ledger.symbol(pool.token1()).unwrap(), "WETH");
            assert_eq!(pool.name(), "USDC_WETH_500");
        }
    }

    #[test]
    fn test_rejects_bad_construction() {
        let mut ledger = InMemoryLedger::new();
        let deployer = ledger.create_account();
        let usdc = Token::new("USDC", dec!(3300));
        let weth = Token::new("WETH", dec!(1));
        assert!(matches!(
            Pool::new(&mut ledger, &weth, &usdc, 500, deployer),
            Err(SimulationError::InvalidTokenOrdering { .. })
        ));
        assert_eq!(
            Pool::new(&mut ledger, &usdc, &weth, 333, deployer).unwrap_err(),
            SimulationError::InvalidFeeTier(333)
        );
    }

    #[test]
    fn test_pool_create_price() {
        let (ledger, pool, _) = usdc_weth();
        let (sqrt, tick) = pool.sqrt_price_tick(&ledger).unwrap();
        assert_eq!(sqrt, price_to_sqrt_price_x96(1.0 / 3300.0).unwrap());
        assert_eq!(tick, -81_021);
        assert_eq!(pool.current_tick(), -81_021);

        let (price0, price1) = pool.exchange_prices().unwrap();
        assert!((price0 - 3300.0).abs() < 1e-9);
        assert!((price1 - 1.0 / 3300.0).abs() < 1e-16);

        let (ledger, pool, _) = dia_usdc();
        let (sqrt, tick) = pool.sqrt_price_tick(&ledger).unwrap();
        assert_eq!(sqrt, U256::one() << 96);
        assert_eq!(tick, 0);
    }

    #[test]
    fn test_mint_and_burn_tokens() {
        let (mut ledger, pool, _) = dia_usdc();
        let agent = ledger.create_account();
        pool.mint_tokens(&mut ledger, dec!(10), dec!(20), agent).unwrap();
        assert_eq!(pool.pair_balance(&ledger, agent).unwrap(), (dec!(10), dec!(20)));

        // token1 burn exceeds the balance and is skipped
        pool.burn_tokens(&mut ledger, dec!(4), dec!(25), agent).unwrap();
        assert_eq!(pool.pair_balance(&ledger, agent).unwrap(), (dec!(6), dec!(20)));

        pool.burn_tokens(&mut ledger, dec!(0), dec!(20), agent).unwrap();
        assert_eq!(pool.pair_balance(&ledger, agent).unwrap(), (dec!(6), dec!(0)));
    }

    #[test]
    fn test_mint_position_and_remove_half() {
        let (mut ledger, mut pool, _) = usdc_weth();
        let agent = ledger.create_account();
        pool.mint_tokens(&mut ledger, dec!(9900), dec!(3), agent).unwrap();

        let (a0, a1, id) = pool
            .mint_position(&mut ledger, dec!(3300), dec!(1), dec!(3200), dec!(3400), agent)
            .unwrap();
        assert_eq!(id, 1);
        assert_eq!(a0, ether(3300));
        assert_eq!(a1, raw("994534642988408561"));
        assert_eq!(
            pool.reserves(&ledger).unwrap(),
            (dec!(3300), dec!(0.994534642988408561))
        );

        let (fee, lower, upper, liquidity) = pool.get_position(&ledger, id).unwrap();
        assert_eq!((fee, lower, upper), (500, -81_320, -80_720));
        assert_eq!(liquidity, 3_848_150_176_386_966_597_483);
        assert_eq!(pool.positions().get(id).unwrap().liquidity, liquidity);

        let before = pool.pair_balance(&ledger, agent).unwrap();
        let (r0, r1) = pool.remove_liquidity(&mut ledger, id, dec!(0.5), agent).unwrap();
        let (res0, res1) = pool.reserves(&ledger).unwrap();
        assert_eq!(res0.round_dp(16), dec!(1650));
        assert_eq!(res1.round_dp(16), dec!(0.4972673214942043));

        let (_, _, _, remaining) = pool.get_position(&ledger, id).unwrap();
        assert_eq!(remaining, liquidity - liquidity / 2);
        assert_eq!(pool.positions().get(id).unwrap().liquidity, remaining);

        let after = pool.pair_balance(&ledger, agent).unwrap();
        assert_eq!(after.0 - before.0, Amount::from_raw(r0).to_decimal().unwrap());
        assert_eq!(after.1 - before.1, Amount::from_raw(r1).to_decimal().unwrap());
    }

    #[test]
    fn test_mint_position_checks_balance() {
        let (mut ledger, mut pool, _) = usdc_weth();
        let agent = ledger.create_account();
        pool.mint_tokens(&mut ledger, dec!(100), dec!(3), agent).unwrap();
        let err = pool
            .mint_position(&mut ledger, dec!(3300), dec!(1), dec!(3200), dec!(3400), agent)
            .unwrap_err();
        assert!(matches!(err, SimulationError::InsufficientBalance { .. }));
        assert!(pool.positions().is_empty());
    }

    #[test]
    fn test_stable_position_ticks() {
        let (mut ledger, mut pool, _) = dia_usdc();
        let agent = ledger.create_account();
        pool.mint_tokens(&mut ledger, dec!(2), dec!(2), agent).unwrap();
        let (a0, a1, id) = pool
            .mint_position(&mut ledger, dec!(1), dec!(1), dec!(0.97), dec!(1.02), agent)
            .unwrap();
        let (_, lower, upper, _) = pool.get_position(&ledger, id).unwrap();
        assert_eq!((lower, upper), (-200, 300));
        assert_eq!(a0, ether(1));
        assert_eq!(a1, raw("668331854320855885"));
    }

    #[test]
    fn test_increase_and_remove_liquidity_monotonic() {
        let (mut ledger, mut pool, _) = dia_usdc();
        let agent = ledger.create_account();
        pool.mint_tokens(&mut ledger, dec!(100), dec!(100), agent).unwrap();
        let (a0, a1, id) = pool
            .mint_position(&mut ledger, dec!(50), dec!(50), dec!(0.99), dec!(1.01), agent)
            .unwrap();
        assert_eq!((a0, a1), (ether(50), ether(50)));
        let (_, _, _, start) = pool.get_position(&ledger, id).unwrap();

        let (added, u0, u1) = pool
            .increase_liquidity(&mut ledger, id, dec!(10), dec!(10), agent)
            .unwrap();
        assert_eq!((u0, u1), (ether(10), ether(10)));
        let (_, _, _, grown) = pool.get_position(&ledger, id).unwrap();
        assert_eq!(grown, start + added);
        assert_eq!(pool.reserves(&ledger).unwrap(), (dec!(60), dec!(60)));

        pool.remove_liquidity(&mut ledger, id, dec!(0.15), agent).unwrap();
        let (_, _, _, shrunk) = pool.get_position(&ledger, id).unwrap();
        assert!(shrunk < grown);

        pool.remove_liquidity(&mut ledger, id, dec!(1), agent).unwrap();
        let (_, _, _, empty) = pool.get_position(&ledger, id).unwrap();
        assert_eq!(empty, 0);
    }

    #[test]
    fn test_remove_liquidity_fraction_bounds() {
        let (mut ledger, mut pool, _) = dia_usdc();
        let agent = ledger.create_account();
        for fraction in [dec!(0), dec!(-0.1), dec!(1.01)] {
            assert_eq!(
                pool.remove_liquidity(&mut ledger, 1, fraction, agent),
                Err(SimulationError::InvalidFraction(fraction))
            );
        }
    }

    #[test]
    fn test_remove_liquidity_of_empty_position_is_noop() {
        let (mut ledger, mut pool, _) = dia_usdc();
        let agent = ledger.create_account();
        pool.mint_tokens(&mut ledger, dec!(10), dec!(10), agent).unwrap();
        let (_, _, id) = pool
            .mint_position(&mut ledger, dec!(1), dec!(1), dec!(0.98), dec!(1.02), agent)
            .unwrap();
        pool.remove_liquidity(&mut ledger, id, dec!(1), agent).unwrap();
        let balances = pool.pair_balance(&ledger, agent).unwrap();

        let returned = pool.remove_liquidity(&mut ledger, id, dec!(0.5), agent).unwrap();
        assert_eq!(returned, (U256::zero(), U256::zero()));
        assert_eq!(pool.pair_balance(&ledger, agent).unwrap(), balances);
    }

    #[test]
    fn test_remove_liquidity_checks_owner_first() {
        let (mut ledger, mut pool, _) = dia_usdc();
        let owner = ledger.create_account();
        let stranger = ledger.create_account();
        pool.mint_tokens(&mut ledger, dec!(10), dec!(10), owner).unwrap();
        let (_, _, id) = pool
            .mint_position(&mut ledger, dec!(1), dec!(1), dec!(0.98), dec!(1.02), owner)
            .unwrap();

        let not_owner = SimulationError::LedgerOperationFailed(LedgerError::NotOwner {
            id,
            caller: stranger,
        });
        // rounds to zero liquidity, still refused
        assert_eq!(
            pool.remove_liquidity(&mut ledger, id, dec!(0.0000000000000000000001), stranger),
            Err(not_owner.clone())
        );
        assert_eq!(
            pool.remove_liquidity(&mut ledger, id, dec!(0.5), stranger),
            Err(not_owner)
        );
        assert_eq!(
            pool.remove_liquidity(&mut ledger, id, dec!(0.0000000000000000000001), owner),
            Ok((U256::zero(), U256::zero()))
        );
    }

    #[test]
    fn test_position_mirror_tracks_owed_fees() {
        let (mut ledger, mut pool, _) = dia_usdc();
        let lp = ledger.create_account();
        let trader = ledger.create_account();
        pool.mint_tokens(&mut ledger, dec!(1000), dec!(1000), lp).unwrap();
        pool.mint_tokens(&mut ledger, dec!(50), dec!(0), trader).unwrap();
        let (_, _, id) = pool
            .mint_position(&mut ledger, dec!(900), dec!(900), dec!(0.98), dec!(1.02), lp)
            .unwrap();
        pool.swap_0_for_1(&mut ledger, dec!(50), trader).unwrap();

        pool.increase_liquidity(&mut ledger, id, dec!(10), dec!(10), lp)
            .unwrap();
        let state = ledger.position_state(id).unwrap();
        let mirror = pool.positions().get(id).unwrap();
        assert!(!state.tokens_owed0.is_zero());
        assert_eq!((mirror.owed0, mirror.owed1), (state.tokens_owed0, state.tokens_owed1));
        assert_eq!(mirror.liquidity, state.liquidity);

        pool.remove_liquidity(&mut ledger, id, dec!(0.5), lp).unwrap();
        let mirror = pool.positions().get(id).unwrap();
        assert!(mirror.owed0.is_zero());
        assert!(mirror.owed1.is_zero());
    }

    #[test]
    fn test_swap_against_stable_position() {
        let (mut ledger, mut pool, _) = dia_usdc();
        let lp = ledger.create_account();
        let trader = ledger.create_account();
        pool.mint_tokens(&mut ledger, dec!(1000), dec!(1000), lp).unwrap();
        pool.mint_tokens(&mut ledger, dec!(10), dec!(10), trader).unwrap();
        let (a0, a1, _) = pool
            .mint_position(&mut ledger, dec!(900), dec!(900), dec!(0.98), dec!(1.02), lp)
            .unwrap();
        assert_eq!((a0, a1), (ether(900), ether(900)));

        let (amount_in, amount_out) = pool.swap_0_for_1(&mut ledger, dec!(5), trader).unwrap();
        assert_eq!(amount_in, ether(5));
        assert_eq!(amount_out, raw("4997223911806880660"));
        let (r0, r1) = pool.reserves(&ledger).unwrap();
        assert_eq!(r0, dec!(905));
        assert_eq!(r1, dec!(895.002776088193119340));
        assert!(pool.current_tick() < 0);
        assert_eq!(pool.metrics().pending_volume(), (amount_in, amount_out));

        let (t0, t1) = pool.pair_balance(&ledger, trader).unwrap();
        assert_eq!(t0, dec!(5));
        assert_eq!(t1, dec!(10) + Amount::from_raw(amount_out).to_decimal().unwrap());
    }

    #[test]
    fn test_swap_1_for_0_is_symmetric_at_par() {
        let (mut ledger, mut pool, _) = dia_usdc();
        let lp = ledger.create_account();
        let trader = ledger.create_account();
        pool.mint_tokens(&mut ledger, dec!(900), dec!(900), lp).unwrap();
        pool.mint_tokens(&mut ledger, dec!(0), dec!(5), trader).unwrap();
        pool.mint_position(&mut ledger, dec!(900), dec!(900), dec!(0.98), dec!(1.02), lp)
            .unwrap();

        let (_, out) = pool.swap_1_for_0(&mut ledger, dec!(5), trader).unwrap();
        assert_eq!(out, raw("4997223911806880660"));
        assert!(pool.current_tick() >= 0);
        assert_eq!(pool.metrics().pending_volume(), (out, ether(5)));
        assert!(matches!(
            pool.swap_1_for_0(&mut ledger, dec!(1), trader),
            Err(SimulationError::InsufficientBalance { .. })
        ));
    }

    #[test]
    fn test_reserves_conserved_across_operations() {
        let (mut ledger, mut pool, _) = dia_usdc();
        let lp = ledger.create_account();
        let trader = ledger.create_account();
        pool.mint_tokens(&mut ledger, dec!(1000), dec!(1000), lp).unwrap();
        pool.mint_tokens(&mut ledger, dec!(100), dec!(100), trader).unwrap();
        pool.mint_position(&mut ledger, dec!(500), dec!(500), dec!(0.98), dec!(1.02), lp)
            .unwrap();
        let (b0, b1) = pool.reserves(&ledger).unwrap();

        let (in0, out1) = pool.swap_0_for_1(&mut ledger, dec!(20), trader).unwrap();
        let (in1, out0) = pool.swap_1_for_0(&mut ledger, dec!(30), trader).unwrap();

        let tokens = |v: U256| Amount::from_raw(v).to_decimal().unwrap();
        let (r0, r1) = pool.reserves(&ledger).unwrap();
        assert_eq!(r0, b0 + tokens(in0) - tokens(out0));
        assert_eq!(r1, b1 + tokens(in1) - tokens(out1));

        // every token minted is either held by an agent or by the pool
        let (l0, l1) = pool.pair_balance(&ledger, lp).unwrap();
        let (t0, t1) = pool.pair_balance(&ledger, trader).unwrap();
        assert_eq!(l0 + t0 + r0, dec!(1100));
        assert_eq!(l1 + t1 + r1, dec!(1100));
    }

    #[test]
    fn test_dump_to_price_limit() {
        let (mut ledger, mut pool, _) = dia_usdc();
        let lp = ledger.create_account();
        let whale = ledger.create_account();
        pool.mint_tokens(&mut ledger, dec!(100), dec!(100), lp).unwrap();
        pool.mint_tokens(&mut ledger, dec!(2000000), dec!(0), whale).unwrap();
        pool.mint_position(&mut ledger, dec!(100), dec!(100), dec!(0.98), dec!(1.02), lp)
            .unwrap();

        let (_, out) = pool.swap_0_for_1(&mut ledger, dec!(1000000), whale).unwrap();
        assert!(out <= ether(100));
        assert_eq!(pool.sqrt_price_x96(), MIN_SQRT_RATIO + U256::one());

        let (_, again) = pool.swap_0_for_1(&mut ledger, dec!(1000000), whale).unwrap();
        assert!(again.is_zero());

        let (price0, price1) = pool.exchange_prices().unwrap();
        assert!(price0.is_finite() && price0 > 3.4e38);
        assert!(price1 > 0.0 && price1 < 3.0e-39);
        pool.collect_data(&ledger, 1).unwrap();
        assert_eq!(pool.records()[0].price0, price0);
        assert_eq!(pool.records()[0].price1, price1);
    }

    #[test]
    fn test_collect_data_records_step() {
        let (mut ledger, mut pool, _) = dia_usdc();
        let lp = ledger.create_account();
        pool.mint_tokens(&mut ledger, dec!(905), dec!(900), lp).unwrap();
        pool.mint_position(&mut ledger, dec!(900), dec!(900), dec!(0.98), dec!(1.02), lp)
            .unwrap();
        pool.swap_0_for_1(&mut ledger, dec!(5), lp).unwrap();

        pool.collect_data(&ledger, 1).unwrap();
        pool.collect_data(&ledger, 2).unwrap();
        let records = pool.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].step, 1);
        assert_eq!(records[0].volume0, dec!(5));
        assert_eq!(records[0].reserve0, dec!(905));
        assert!(records[1].volume0.is_zero());
        assert_eq!(records[1].tick, pool.current_tick());
    }

    #[test]
    fn test_scale_liquidity_floors() {
        assert_eq!(
            scale_liquidity(3_848_150_176_386_966_597_483, dec!(0.5)).unwrap(),
            1_924_075_088_193_483_298_741
        );
        assert_eq!(scale_liquidity(10, dec!(0.19)).unwrap(), 1);
        assert_eq!(scale_liquidity(1, dec!(0.5)).unwrap(), 0);
        assert_eq!(scale_liquidity(u128::MAX, dec!(1)).unwrap(), u128::MAX);
    }
}
