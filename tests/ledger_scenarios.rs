//! End-to-end ledger scenario tests
//!
//! These tests exercise the full deposit-invest-redeem lifecycle through
//! the public service API, including the properties that must hold under
//! concurrent access:
//! - Deposits are never lost, whatever the interleaving
//! - Investments never fire below the minimum balance and always zero the
//!   balance while awarding floor-divided points
//! - Jointly unaffordable concurrent redemptions resolve with one winner
//! - Request-id replays do not double-apply mutations
//! - Balances and points never go negative, including on failed paths
//! - The audit trail reconstructs the account state

#[cfg(test)]
mod tests {
    use rewards_ledger::catalog::RewardCatalog;
    use rewards_ledger::config::LedgerConfig;
    use rewards_ledger::core::{InMemoryAccountStore, InMemoryTransactionLog, ReplayRunner};
    use rewards_ledger::gateway::{AutoApproveGateway, DecliningGateway};
    use rewards_ledger::io::{read_operations, write_accounts_csv};
    use rewards_ledger::types::{LedgerError, TransactionKind};
    use rewards_ledger::{AccountIdentity, LedgerService};
    use rust_decimal::Decimal;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use uuid::Uuid;

    type InMemoryLedger =
        LedgerService<InMemoryAccountStore, InMemoryTransactionLog, AutoApproveGateway>;

    fn ledger() -> InMemoryLedger {
        ledger_with_config(LedgerConfig::default())
    }

    fn ledger_with_config(config: LedgerConfig) -> InMemoryLedger {
        LedgerService::new(
            InMemoryAccountStore::new(),
            InMemoryTransactionLog::new(),
            AutoApproveGateway,
            RewardCatalog::default(),
            config,
        )
    }

    fn identity(id: &str) -> AccountIdentity {
        AccountIdentity::new(id, format!("{}@example.com", id))
    }

    fn dec(value: i64, scale: u32) -> Decimal {
        Decimal::new(value, scale)
    }

    #[tokio::test]
    async fn test_full_lifecycle_scenario() {
        let ledger = ledger();
        let id = identity("acct-1");

        // Two deposits accumulate into the pending balance.
        let account = ledger
            .deposit(&id, dec(1500, 2), Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(account.pending_balance, dec(1500, 2));

        let account = ledger
            .deposit(&id, dec(1000, 2), Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(account.pending_balance, dec(2500, 2));

        // Investing 25.00 awards floor(25 / 10) = 2 points.
        let outcome = ledger.invest(&id, Uuid::new_v4()).await.unwrap();
        assert_eq!(outcome.account.pending_balance, Decimal::ZERO);
        assert_eq!(outcome.points_earned, 2);
        assert_eq!(outcome.account.points, 2);

        // Reward 1 costs 50 points; 2 points is not enough.
        let result = ledger.redeem(&id, 1, Uuid::new_v4()).await;
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientPoints { .. })
        ));

        // Accumulate to exactly 50 points via another deposit/invest cycle.
        ledger
            .deposit(&id, dec(48000, 2), Uuid::new_v4())
            .await
            .unwrap();
        let outcome = ledger.invest(&id, Uuid::new_v4()).await.unwrap();
        assert_eq!(outcome.points_earned, 48);
        assert_eq!(outcome.account.points, 50);

        let account = ledger.redeem(&id, 1, Uuid::new_v4()).await.unwrap();
        assert_eq!(account.points, 0);
        assert_eq!(account.pending_balance, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_invest_below_minimum_leaves_state_unchanged() {
        let ledger = ledger();
        let id = identity("acct-1");

        ledger
            .deposit(&id, dec(1999, 2), Uuid::new_v4())
            .await
            .unwrap();
        let before = ledger.get_account("acct-1").unwrap();

        let result = ledger.invest(&id, Uuid::new_v4()).await;

        assert!(matches!(
            result,
            Err(LedgerError::InsufficientBalance { .. })
        ));
        assert_eq!(ledger.get_account("acct-1").unwrap(), before);
    }

    #[tokio::test]
    async fn test_gateway_failure_leaves_no_trace() {
        let ledger = LedgerService::new(
            InMemoryAccountStore::new(),
            InMemoryTransactionLog::new(),
            DecliningGateway::new("processor declined"),
            RewardCatalog::default(),
            LedgerConfig::default(),
        );
        let id = identity("acct-1");

        ledger
            .deposit(&id, dec(2500, 2), Uuid::new_v4())
            .await
            .unwrap();
        let before = ledger.get_account("acct-1").unwrap();
        let transactions_before = ledger.list_transactions("acct-1").unwrap().len();

        let result = ledger.invest(&id, Uuid::new_v4()).await;

        assert!(matches!(result, Err(LedgerError::GatewayFailure { .. })));
        assert_eq!(ledger.get_account("acct-1").unwrap(), before);
        assert_eq!(
            ledger.list_transactions("acct-1").unwrap().len(),
            transactions_before
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_deposits_are_never_lost() {
        // A generous retry budget keeps heavy same-account contention from
        // exhausting attempts; the assertion is about lost updates.
        let ledger = ledger_with_config(LedgerConfig {
            cas_max_attempts: 1_000,
            ..LedgerConfig::default()
        });

        let mut handles = vec![];
        for _ in 0..8 {
            let ledger = ledger.clone();
            handles.push(tokio::spawn(async move {
                let id = identity("acct-1");
                for _ in 0..25 {
                    ledger
                        .deposit(&id, Decimal::ONE, Uuid::new_v4())
                        .await
                        .unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let account = ledger.get_account("acct-1").unwrap();
        assert_eq!(account.pending_balance, Decimal::from(200));
        assert_eq!(account.version, 200);
        assert_eq!(ledger.list_transactions("acct-1").unwrap().len(), 200);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_deposits_to_different_accounts_are_independent() {
        let ledger = ledger();

        let mut handles = vec![];
        for i in 0..8 {
            let ledger = ledger.clone();
            handles.push(tokio::spawn(async move {
                let id = identity(&format!("acct-{}", i));
                for _ in 0..10 {
                    ledger
                        .deposit(&id, Decimal::from(2), Uuid::new_v4())
                        .await
                        .unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        for i in 0..8 {
            let account = ledger.get_account(&format!("acct-{}", i)).unwrap();
            assert_eq!(account.pending_balance, Decimal::from(20));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_jointly_unaffordable_redemptions_have_one_winner() {
        let ledger = ledger();
        let id = identity("acct-1");

        // 500.00 invested earns exactly 50 points, enough for one
        // 50-point reward but not two.
        ledger
            .deposit(&id, dec(50000, 2), Uuid::new_v4())
            .await
            .unwrap();
        ledger.invest(&id, Uuid::new_v4()).await.unwrap();

        let first = {
            let ledger = ledger.clone();
            let id = id.clone();
            tokio::spawn(async move { ledger.redeem(&id, 1, Uuid::new_v4()).await })
        };
        let second = {
            let ledger = ledger.clone();
            let id = id.clone();
            tokio::spawn(async move { ledger.redeem(&id, 1, Uuid::new_v4()).await })
        };

        let results = [first.await.unwrap(), second.await.unwrap()];
        let successes = results.iter().filter(|r| r.is_ok()).count();
        let rejections = results
            .iter()
            .filter(|r| matches!(r, Err(LedgerError::InsufficientPoints { .. })))
            .count();

        assert_eq!(successes, 1);
        assert_eq!(rejections, 1);
        assert_eq!(ledger.get_account("acct-1").unwrap().points, 0);
    }

    #[tokio::test]
    async fn test_replayed_request_id_applies_once() {
        let ledger = ledger();
        let id = identity("acct-1");
        let request = Uuid::new_v4();

        let first = ledger.deposit(&id, dec(1000, 2), request).await.unwrap();
        let second = ledger.deposit(&id, dec(1000, 2), request).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(
            ledger.get_account("acct-1").unwrap().pending_balance,
            dec(1000, 2)
        );
        assert_eq!(ledger.list_transactions("acct-1").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_operations_never_produce_negative_state() {
        let ledger = ledger();
        let id = identity("acct-1");

        // Rejected deposit, invest, and redeem attempts in sequence.
        let _ = ledger.deposit(&id, dec(50, 2), Uuid::new_v4()).await;
        let _ = ledger.invest(&id, Uuid::new_v4()).await;
        let _ = ledger.redeem(&id, 1, Uuid::new_v4()).await;
        let _ = ledger.redeem(&id, 999, Uuid::new_v4()).await;

        if let Ok(account) = ledger.get_account("acct-1") {
            assert!(account.pending_balance >= Decimal::ZERO);
            // points is unsigned; reaching here at all means nothing
            // underflowed on the failed paths.
            assert_eq!(account.pending_balance, Decimal::ZERO);
            assert_eq!(account.points, 0);
        }
    }

    #[tokio::test]
    async fn test_audit_trail_reconstructs_account_state() {
        let ledger = ledger();
        let id = identity("acct-1");

        ledger
            .deposit(&id, dec(50000, 2), Uuid::new_v4())
            .await
            .unwrap();
        ledger.invest(&id, Uuid::new_v4()).await.unwrap();
        ledger.redeem(&id, 1, Uuid::new_v4()).await.unwrap();
        ledger
            .deposit(&id, dec(750, 2), Uuid::new_v4())
            .await
            .unwrap();

        let mut balance = Decimal::ZERO;
        let mut points: i64 = 0;
        for tx in ledger.list_transactions("acct-1").unwrap() {
            match tx.kind {
                TransactionKind::Deposit => balance += tx.amount,
                TransactionKind::Investment => balance -= tx.amount,
                TransactionKind::Redemption => {}
            }
            points += tx.points_delta;
        }

        let account = ledger.get_account("acct-1").unwrap();
        assert_eq!(account.pending_balance, balance);
        assert_eq!(account.points as i64, points);
    }

    #[tokio::test]
    async fn test_csv_replay_end_to_end() {
        let mut input = NamedTempFile::new().unwrap();
        write!(
            input,
            "op,account,email,amount,reward,request_id\n\
             deposit,alice,alice@example.com,15.00,,\n\
             deposit,alice,alice@example.com,10.00,,\n\
             invest,alice,alice@example.com,,,\n\
             deposit,bob,bob@example.com,500.00,,\n\
             invest,bob,bob@example.com,,,\n\
             redeem,bob,bob@example.com,,1,\n"
        )
        .unwrap();
        input.flush().unwrap();

        let records = read_operations(input.path()).unwrap();
        assert_eq!(records.len(), 6);

        let ledger = ledger();
        let runner = ReplayRunner::new(ledger.clone(), 4);
        let outcomes = runner.run(records).await;
        assert!(outcomes.iter().all(|o| o.result.is_ok()));

        assert_eq!(ledger.reconcile(), 0);

        let mut output = Vec::new();
        write_accounts_csv(&ledger.accounts(), &mut output).unwrap();
        let output_str = String::from_utf8(output).unwrap();

        assert_eq!(
            output_str,
            "account,email,pending_balance,points,version\n\
             alice,alice@example.com,0.00,2,3\n\
             bob,bob@example.com,0.00,0,3\n"
        );
    }
}
