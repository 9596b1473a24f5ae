//! Property tests for the wallet balance invariants the ledger store's SQL
//! flows are responsible for maintaining (spec'd behavior, not the SQL
//! itself — these exercise an in-memory model of the same state machine so
//! they can run without a database).

use proptest::prelude::*;

#[derive(Debug, Clone)]
struct BlockedCredit {
    amount: i64,
}

#[derive(Debug, Clone)]
struct BlockedDebit {
    amount: i64,
}

/// Mirrors the wallet row transitions `charge`/`debit`/`release_due`/
/// `settle_debit_success`/`settle_debit_failure` perform in
/// `PostgresLedgerStore`, without a database underneath.
#[derive(Debug, Clone, Default)]
struct WalletModel {
    total_balance: i64,
    available_balance: i64,
    blocked_credits: Vec<BlockedCredit>,
    blocked_debits: Vec<BlockedDebit>,
}

impl WalletModel {
    fn charge_immediate(&mut self, amount: i64) {
        self.total_balance += amount;
        self.available_balance += amount;
    }

    fn charge_deferred(&mut self, amount: i64) {
        self.total_balance += amount;
        self.blocked_credits.push(BlockedCredit { amount });
    }

    /// Returns `false` (the `InsufficientFunds` case) without mutating state.
    fn debit(&mut self, amount: i64) -> bool {
        if self.available_balance < amount {
            return false;
        }
        self.available_balance -= amount;
        self.blocked_debits.push(BlockedDebit { amount });
        true
    }

    fn release_one(&mut self) {
        if let Some(credit) = self.blocked_credits.pop() {
            self.available_balance += credit.amount;
        }
    }

    fn settle_debit_success(&mut self) {
        if let Some(debit) = self.blocked_debits.pop() {
            self.total_balance -= debit.amount;
        }
    }

    fn settle_debit_failure(&mut self) {
        if let Some(debit) = self.blocked_debits.pop() {
            self.available_balance += debit.amount;
        }
    }

    /// Invariant 1 (spec §8): `0 <= available_balance <= total_balance`.
    fn balances_ordered(&self) -> bool {
        0 <= self.available_balance && self.available_balance <= self.total_balance
    }
}

#[derive(Debug, Clone)]
enum Op {
    ChargeImmediate(i64),
    ChargeDeferred(i64),
    Debit(i64),
    Release,
    SettleSuccess,
    SettleFailure,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1i64..=10_000).prop_map(Op::ChargeImmediate),
        (1i64..=10_000).prop_map(Op::ChargeDeferred),
        (1i64..=10_000).prop_map(Op::Debit),
        Just(Op::Release),
        Just(Op::SettleSuccess),
        Just(Op::SettleFailure),
    ]
}

proptest! {
    /// Invariant 1: for any sequence of valid operations on a single wallet,
    /// `0 <= available_balance <= total_balance` holds after every one.
    #[test]
    fn balances_stay_ordered_after_every_operation(ops in proptest::collection::vec(op_strategy(), 0..200)) {
        let mut wallet = WalletModel::default();

        for op in ops {
            match op {
                Op::ChargeImmediate(amount) => wallet.charge_immediate(amount),
                Op::ChargeDeferred(amount) => wallet.charge_deferred(amount),
                Op::Debit(amount) => {
                    wallet.debit(amount);
                }
                Op::Release => wallet.release_one(),
                Op::SettleSuccess => wallet.settle_debit_success(),
                Op::SettleFailure => wallet.settle_debit_failure(),
            }

            prop_assert!(wallet.balances_ordered());
        }
    }

    /// Invariant 8: with balance `B` and N concurrent debits of amount `A`
    /// attempted serially (the store linearizes them via the wallet row
    /// lock), exactly `floor(B / A)` succeed and the remainder fail with
    /// `InsufficientFunds`.
    #[test]
    fn only_floor_b_over_a_debits_succeed(
        initial_balance in 0i64..100_000,
        amount in 1i64..10_000,
        attempts in 1usize..50,
    ) {
        let mut wallet = WalletModel::default();
        wallet.charge_immediate(initial_balance);

        let mut succeeded = 0usize;
        for _ in 0..attempts {
            if wallet.debit(amount) {
                succeeded += 1;
            }
        }

        let expected = ((initial_balance / amount) as usize).min(attempts);
        prop_assert_eq!(succeeded, expected);
        prop_assert!(wallet.balances_ordered());
    }

    /// A failed debit restores `available_balance` only — `total_balance`
    /// was never touched at reservation time (spec §9, open question 3).
    #[test]
    fn failed_debit_restores_available_balance_only(initial_balance in 0i64..100_000, amount in 1i64..100_000) {
        let mut wallet = WalletModel::default();
        wallet.charge_immediate(initial_balance);
        let total_before = wallet.total_balance;

        if wallet.debit(amount) {
            wallet.settle_debit_failure();
            prop_assert_eq!(wallet.total_balance, total_before);
            prop_assert_eq!(wallet.available_balance, initial_balance);
        }
    }

    /// A successful debit settlement decrements `total_balance` by the
    /// reserved amount and leaves `available_balance` untouched (it was
    /// already decremented at reservation time).
    #[test]
    fn successful_debit_settlement_only_moves_total_balance(initial_balance in 1i64..100_000, amount in 1i64..100_000) {
        let mut wallet = WalletModel::default();
        wallet.charge_immediate(initial_balance);

        if wallet.debit(amount) {
            let available_after_reserve = wallet.available_balance;
            wallet.settle_debit_success();
            prop_assert_eq!(wallet.total_balance, initial_balance - amount);
            prop_assert_eq!(wallet.available_balance, available_after_reserve);
        }
    }
}
