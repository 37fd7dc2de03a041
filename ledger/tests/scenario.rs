//! End-to-end scenarios exercising the ledger through its public surface.

use std::sync::Arc;

use custodia_common::{Address, LedgerError, Units};
use custodia_ledger::{EventJournal, ImmediateSettlement, Ledger};

fn ledger(owner: &str) -> Ledger {
    Ledger::new(
        Address::new(owner),
        Arc::new(ImmediateSettlement),
        Arc::new(EventJournal::new()),
    )
    .unwrap()
}

#[tokio::test]
async fn custody_lifecycle() {
    let ledger = ledger("OWNER");
    let owner = Address::new("OWNER");
    let alice = Address::new("ALICE");
    let bob = Address::new("BOB");
    let carol = Address::new("CAROL");

    // Anyone may credit any account.
    ledger.deposit(&alice, 100).await.unwrap();
    assert_eq!(ledger.balance_of(&alice).await, 100);

    // Owner delegates withdrawal rights to Bob.
    ledger.authorize_agent(&owner, &bob).await.unwrap();
    assert!(ledger.is_agent(&bob).await);

    // Bob withdraws on Alice's behalf.
    ledger.withdraw(&bob, &alice, 40).await.unwrap();
    assert_eq!(ledger.balance_of(&alice).await, 60);

    let withdrawals: Vec<_> = ledger
        .journal()
        .snapshot()
        .into_iter()
        .filter(|r| r.event.kind() == "withdrawal")
        .collect();
    assert_eq!(withdrawals.len(), 1);

    // Carol holds no role.
    let err = ledger.withdraw(&carol, &alice, 10).await.unwrap_err();
    assert!(matches!(err, LedgerError::Unauthorized { .. }));
    assert_eq!(ledger.balance_of(&alice).await, 60);

    // Even the owner cannot overdraw.
    let err = ledger.withdraw(&owner, &alice, 1000).await.unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientBalance { .. }));
    assert_eq!(ledger.balance_of(&alice).await, 60);

    // Revocation takes effect immediately.
    ledger.deauthorize_agent(&owner, &bob).await.unwrap();
    let err = ledger.withdraw(&bob, &alice, 10).await.unwrap_err();
    assert!(matches!(err, LedgerError::Unauthorized { .. }));
}

#[tokio::test]
async fn ownership_handoff() {
    let ledger = ledger("OWNER");
    let owner = Address::new("OWNER");
    let dana = Address::new("DANA");
    let eve = Address::new("EVE");

    ledger.transfer_ownership(&owner, &dana).await.unwrap();
    assert_eq!(ledger.current_owner().await, dana);

    let err = ledger.authorize_agent(&owner, &eve).await.unwrap_err();
    assert!(matches!(err, LedgerError::Unauthorized { .. }));

    ledger.authorize_agent(&dana, &eve).await.unwrap();
    assert!(ledger.is_agent(&eve).await);
}

#[tokio::test]
async fn journal_orders_events_across_accounts() {
    let ledger = ledger("OWNER");
    let owner = Address::new("OWNER");

    ledger.deposit(&Address::new("A"), 10).await.unwrap();
    ledger.deposit(&Address::new("B"), 20).await.unwrap();
    ledger.authorize_agent(&owner, &Address::new("X")).await.unwrap();
    ledger
        .withdraw(&owner, &Address::new("B"), 5)
        .await
        .unwrap();

    let kinds: Vec<_> = ledger
        .journal()
        .snapshot()
        .into_iter()
        .map(|r| r.event.kind())
        .collect();
    assert_eq!(
        kinds,
        vec!["deposit", "deposit", "agent_authorized", "withdrawal"]
    );
}

mod conservation {
    use super::*;
    use proptest::prelude::*;

    /// One step of a randomly generated operation sequence.
    #[derive(Debug, Clone)]
    enum Op {
        Deposit { account: u8, amount: Units },
        Withdraw { caller: u8, account: u8, amount: Units },
        Authorize { agent: u8 },
        Deauthorize { agent: u8 },
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u8..4, 1u128..1_000).prop_map(|(account, amount)| Op::Deposit { account, amount }),
            (0u8..6, 0u8..4, 1u128..1_500).prop_map(|(caller, account, amount)| Op::Withdraw {
                caller,
                account,
                amount
            }),
            (0u8..6).prop_map(|agent| Op::Authorize { agent }),
            (0u8..6).prop_map(|agent| Op::Deauthorize { agent }),
        ]
    }

    fn addr(i: u8) -> Address {
        Address::new(format!("ACCT_{i}"))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Total recorded balance always equals deposits minus successful
        /// withdrawals, whatever sequence of operations ran.
        #[test]
        fn balances_are_conserved(ops in proptest::collection::vec(op_strategy(), 1..80)) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();

            rt.block_on(async move {
                let owner = Address::new("OWNER");
                let ledger = ledger("OWNER");

                let mut deposited: Units = 0;
                let mut withdrawn: Units = 0;

                for op in ops {
                    match op {
                        Op::Deposit { account, amount } => {
                            if ledger.deposit(&addr(account), amount).await.is_ok() {
                                deposited += amount;
                            }
                        }
                        Op::Withdraw { caller, account, amount } => {
                            if ledger.withdraw(&addr(caller), &addr(account), amount).await.is_ok() {
                                withdrawn += amount;
                            }
                        }
                        Op::Authorize { agent } => {
                            let _ = ledger.authorize_agent(&owner, &addr(agent)).await;
                        }
                        Op::Deauthorize { agent } => {
                            let _ = ledger.deauthorize_agent(&owner, &addr(agent)).await;
                        }
                    }
                }

                let mut total: Units = 0;
                for i in 0u8..4 {
                    total += ledger.balance_of(&addr(i)).await;
                }

                assert_eq!(total, deposited - withdrawn);
            });
        }
    }
}
