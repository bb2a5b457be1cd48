//! Property-based tests for LedgerService.
//!
//! Random sequences of deposits, transfers and conversions run against the
//! in-memory store. After every step:
//! - no balance is negative
//! - a rejected operation changed no balance and appended no record
//! - a committed operation appended exactly its own records

use std::sync::Arc;

use proptest::prelude::*;
use rust_decimal::Decimal;
use somon_shared::types::{AccountId, Currency, PageRequest};

use super::balance::Balances;
use super::memory::InMemoryLedgerStore;
use super::service::LedgerService;
use super::store::LedgerStore;
use super::types::NewAccount;

const ACCOUNTS: usize = 3;

#[derive(Debug, Clone)]
enum Op {
    Deposit {
        who: usize,
        amount: Decimal,
    },
    Transfer {
        from: usize,
        to: usize,
        amount: Decimal,
    },
    Convert {
        who: usize,
        from: Currency,
        to: Currency,
        amount: Decimal,
        rate: Decimal,
    },
}

/// Amounts from -10.00 to 300.00, so some are invalid and some overdraw.
fn amount() -> impl Strategy<Value = Decimal> {
    (-1_000i64..30_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Rates from 0.0000 to 20.0000.
fn rate() -> impl Strategy<Value = Decimal> {
    (0i64..200_000i64).prop_map(|v| Decimal::new(v, 4))
}

fn currency() -> impl Strategy<Value = Currency> {
    prop::sample::select(Currency::ALL.to_vec())
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..ACCOUNTS, amount()).prop_map(|(who, amount)| Op::Deposit { who, amount }),
        (0..ACCOUNTS, 0..ACCOUNTS, amount())
            .prop_map(|(from, to, amount)| Op::Transfer { from, to, amount }),
        (0..ACCOUNTS, currency(), currency(), amount(), rate()).prop_map(
            |(who, from, to, amount, rate)| Op::Convert {
                who,
                from,
                to,
                amount,
                rate
            }
        ),
    ]
}

struct Harness {
    runtime: tokio::runtime::Runtime,
    service: LedgerService<InMemoryLedgerStore>,
    ids: Vec<AccountId>,
}

impl Harness {
    fn new(grant: Decimal) -> Self {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let service = LedgerService::new(Arc::new(InMemoryLedgerStore::new()));

        let ids = (0..ACCOUNTS)
            .map(|i| {
                runtime
                    .block_on(service.store().create_account(NewAccount {
                        name: format!("Account {i}"),
                        email: format!("account{i}@example.com"),
                        password_hash: String::new(),
                        opening_balance: grant,
                    }))
                    .unwrap()
                    .id
            })
            .collect();

        Self {
            runtime,
            service,
            ids,
        }
    }

    fn balances(&self) -> Vec<Balances> {
        self.ids
            .iter()
            .map(|id| self.runtime.block_on(self.service.get_balance(*id)).unwrap().balances)
            .collect()
    }

    fn record_counts(&self) -> Vec<u64> {
        self.ids
            .iter()
            .map(|id| {
                self.runtime
                    .block_on(self.service.get_transactions(*id, PageRequest::default()))
                    .unwrap()
                    .meta
                    .total
            })
            .collect()
    }

    /// Applies an op; returns the number of records it should have appended
    /// per account, or `None` if it was rejected.
    fn apply(&self, op: &Op) -> Option<Vec<u64>> {
        let mut appended = vec![0u64; ACCOUNTS];
        let ok = match *op {
            Op::Deposit { who, amount } => {
                appended[who] = 1;
                self.runtime
                    .block_on(self.service.deposit(self.ids[who], amount))
                    .is_ok()
            }
            Op::Transfer { from, to, amount } => {
                appended[from] += 1;
                appended[to] += 1;
                self.runtime
                    .block_on(self.service.transfer(self.ids[from], self.ids[to], amount))
                    .map(|receipt| {
                        assert_eq!(receipt.sent.amount + receipt.received.amount, Decimal::ZERO);
                    })
                    .is_ok()
            }
            Op::Convert {
                who,
                from,
                to,
                amount,
                rate,
            } => {
                appended[who] = 1;
                self.runtime
                    .block_on(self.service.convert_currency(self.ids[who], from, to, amount, rate))
                    .is_ok()
            }
        };
        ok.then_some(appended)
    }
}

fn home_total(balances: &[Balances]) -> Decimal {
    balances.iter().map(|b| b.get(Currency::HOME)).sum()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Balances stay non-negative and every step is all-or-nothing.
    #[test]
    fn prop_operations_are_atomic_and_never_overdraw(
        ops in prop::collection::vec(op(), 1..40),
    ) {
        let harness = Harness::new(Decimal::ONE_HUNDRED);

        for op in &ops {
            let before = harness.balances();
            let counts_before = harness.record_counts();

            let outcome = harness.apply(op);

            let after = harness.balances();
            let counts_after = harness.record_counts();

            for balances in &after {
                prop_assert!(balances.is_non_negative(), "negative balance after {:?}: {:?}", op, balances);
            }

            match outcome {
                None => {
                    prop_assert_eq!(&before, &after, "rejected {:?} changed balances", op);
                    prop_assert_eq!(&counts_before, &counts_after, "rejected {:?} appended records", op);
                }
                Some(appended) => {
                    for i in 0..ACCOUNTS {
                        prop_assert_eq!(counts_after[i], counts_before[i] + appended[i]);
                    }
                }
            }
        }
    }

    /// Transfers never create or destroy home currency; deposits add exactly
    /// their amount.
    #[test]
    fn prop_home_currency_is_conserved(
        ops in prop::collection::vec(
            prop_oneof![
                (0..ACCOUNTS, amount()).prop_map(|(who, amount)| Op::Deposit { who, amount }),
                (0..ACCOUNTS, 0..ACCOUNTS, amount())
                    .prop_map(|(from, to, amount)| Op::Transfer { from, to, amount }),
            ],
            1..40,
        ),
    ) {
        let harness = Harness::new(Decimal::ONE_HUNDRED);
        let mut expected = home_total(&harness.balances());

        for op in &ops {
            if harness.apply(op).is_some() {
                if let Op::Deposit { amount, .. } = op {
                    expected += *amount;
                }
            }
            prop_assert_eq!(home_total(&harness.balances()), expected);
        }
    }

    /// A committed conversion moves exactly `amount` out and
    /// `round4(amount * rate)` in.
    #[test]
    fn prop_conversion_amounts(
        amount in (1i64..=1_000_000i64).prop_map(|v| Decimal::new(v, 4)),
        rate in (1i64..200_000i64).prop_map(|v| Decimal::new(v, 4)),
        to in prop::sample::select(vec![Currency::Usd, Currency::Eur]),
    ) {
        let harness = Harness::new(Decimal::ONE_HUNDRED);
        let id = harness.ids[0];

        let receipt = harness
            .runtime
            .block_on(harness.service.convert_currency(id, Currency::Tjs, to, amount, rate))
            .unwrap();
        let balances = harness.balances()[0];

        prop_assert_eq!(balances.get(Currency::Tjs), Decimal::ONE_HUNDRED - amount);
        prop_assert_eq!(Some(balances.get(to)), crate::currency::convert_amount(amount, rate));
        prop_assert_eq!(receipt.record.amount, amount);
        prop_assert_eq!(receipt.record.currency, Currency::Tjs);
    }
}
