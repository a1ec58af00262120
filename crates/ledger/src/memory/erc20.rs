use crate::error::{LedgerError, LedgerResult};
use crate::Address;
use primitive_types::U256;
use std::collections::BTreeMap;

/// Balance and allowance book of one fungible token.
#[derive(Debug, Clone)]
pub(crate) struct Erc20 {
    pub address: Address,
    pub symbol: String,
    pub deployer: Address,
    pub total_supply: U256,
    balances: BTreeMap<Address, U256>,
    allowances: BTreeMap<(Address, Address), U256>,
}

impl Erc20 {
    pub fn new(address: Address, symbol: &str, deployer: Address) -> Self {
        Self {
            address,
            symbol: symbol.to_string(),
            deployer,
            total_supply: U256::zero(),
            balances: BTreeMap::new(),
            allowances: BTreeMap::new(),
        }
    }

    pub fn balance_of(&self, owner: Address) -> U256 {
        self.balances.get(&owner).copied().unwrap_or_default()
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default()
    }

    pub fn approve(&mut self, owner: Address, spender: Address, amount: U256) {
        self.allowances.insert((owner, spender), amount);
    }

    pub fn mint(&mut self, to: Address, amount: U256) -> LedgerResult<()> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(unisim_domain::error::DomainError::Overflow)?;
        self.total_supply = supply;
        *self.balances.entry(to).or_default() += amount;
        Ok(())
    }

    pub fn burn(&mut self, from: Address, amount: U256) -> LedgerResult<()> {
        self.ensure_balance(from, amount)?;
        self.debit(from, amount);
        self.total_supply -= amount;
        Ok(())
    }

    pub fn ensure_balance(&self, owner: Address, amount: U256) -> LedgerResult<()> {
        let available = self.balance_of(owner);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                token: self.address,
                owner,
                needed: amount,
                available,
            });
        }
        Ok(())
    }

    /// Checks that `spender` may move `amount` out of `owner`.
    pub fn ensure_spendable(&self, owner: Address, spender: Address, amount: U256) -> LedgerResult<()> {
        let available = self.allowance(owner, spender);
        if available < amount {
            return Err(LedgerError::InsufficientAllowance {
                token: self.address,
                owner,
                spender,
                needed: amount,
                available,
            });
        }
        self.ensure_balance(owner, amount)
    }

    pub fn transfer(&mut self, from: Address, to: Address, amount: U256) -> LedgerResult<()> {
        self.ensure_balance(from, amount)?;
        self.debit(from, amount);
        *self.balances.entry(to).or_default() += amount;
        Ok(())
    }

    pub fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> LedgerResult<()> {
        self.ensure_spendable(from, spender, amount)?;
        let allowance = self.allowance(from, spender);
        if allowance != U256::MAX {
            self.allowances.insert((from, spender), allowance - amount);
        }
        self.transfer(from, to, amount)
    }

    fn debit(&mut self, owner: Address, amount: U256) {
        if let Some(balance) = self.balances.get_mut(&owner) {
            *balance -= amount;
        }
    }
}
