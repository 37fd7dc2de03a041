//! Core ledger state machine.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use custodia_common::{Address, LedgerError, LedgerEvent, Result, Units};

use crate::journal::EventJournal;
use crate::role::CallerRole;
use crate::transfer::TransferSink;

/// Mutable ledger state, guarded as a single unit.
struct LedgerState {
    /// The single account with administrative rights.
    owner: Address,
    /// Recorded balances; an absent entry reads as zero.
    balances: HashMap<Address, Units>,
    /// Accounts currently delegated withdrawal rights.
    agents: HashSet<Address>,
}

/// The custodial balance ledger.
///
/// One logical state machine: every mutating operation is a complete,
/// atomic transition over the balance table and agent set. A single mutex
/// guards the state for the whole critical section of each operation,
/// including the awaited external transfer inside [`withdraw`], so
/// concurrent withdrawals against one account are linearized and the
/// non-negative-balance invariant holds under any interleaving.
///
/// The balance decrement of a withdrawal is committed only after the
/// transfer sink reports success; a sink failure or timeout leaves the
/// balance exactly as it was before the call.
///
/// [`withdraw`]: Ledger::withdraw
pub struct Ledger {
    state: Mutex<LedgerState>,
    sink: Arc<dyn TransferSink>,
    journal: Arc<EventJournal>,
}

impl Ledger {
    /// Create a ledger owned by `owner`, with empty balance and agent tables.
    pub fn new(
        owner: Address,
        sink: Arc<dyn TransferSink>,
        journal: Arc<EventJournal>,
    ) -> Result<Self> {
        if owner.is_null() {
            return Err(LedgerError::InvalidArgument(
                "owner must not be the null identity".to_string(),
            ));
        }

        info!(owner = %owner, sink = sink.name(), "Ledger initialized");

        Ok(Self {
            state: Mutex::new(LedgerState {
                owner,
                balances: HashMap::new(),
                agents: HashSet::new(),
            }),
            sink,
            journal,
        })
    }

    /// Credit `amount` to `account`.
    ///
    /// Open to any caller; depositing is additive-only and requires no
    /// authorization. Returns the new balance.
    #[instrument(skip(self))]
    pub async fn deposit(&self, account: &Address, amount: Units) -> Result<Units> {
        require_account(account)?;
        require_positive(amount)?;

        let mut state = self.state.lock().await;

        let balance = state.balances.entry(account.clone()).or_insert(0);
        let new_balance = balance.checked_add(amount).ok_or_else(|| {
            LedgerError::InvalidArgument(format!(
                "deposit of {} would overflow balance of {}",
                amount, balance
            ))
        })?;
        *balance = new_balance;

        self.journal.append(LedgerEvent::Deposit {
            account: account.clone(),
            amount,
        });

        info!(account = %account, amount = %amount, balance = %new_balance, "Deposit recorded");

        Ok(new_balance)
    }

    /// Debit `amount` from `account` and push it to `account` via the
    /// transfer sink.
    ///
    /// `caller` must be the owner or a currently-authorized agent. The
    /// decrement and the external transfer succeed or fail together: the
    /// sufficiency check happens first, the sink is awaited inside the
    /// critical section, and the balance write lands only on sink success.
    /// Returns the new balance.
    #[instrument(skip(self))]
    pub async fn withdraw(&self, caller: &Address, account: &Address, amount: Units) -> Result<Units> {
        let mut state = self.state.lock().await;

        if !CallerRole::resolve(caller, &state.owner, &state.agents).may_withdraw() {
            warn!(caller = %caller, account = %account, "Withdrawal rejected: unauthorized");
            return Err(LedgerError::Unauthorized {
                caller: caller.clone(),
                action: "withdraw",
            });
        }

        require_account(account)?;
        require_positive(amount)?;

        let available = state.balances.get(account).copied().unwrap_or(0);
        if amount > available {
            return Err(LedgerError::InsufficientBalance {
                requested: amount,
                available,
            });
        }

        // The state lock is held across this await: the debit must be
        // linearized with the settlement outcome, and no other mutation may
        // observe the account between the sufficiency check and the commit.
        if let Err(e) = self.sink.transfer(account, amount).await {
            warn!(
                account = %account,
                amount = %amount,
                sink = self.sink.name(),
                error = %e,
                "Transfer failed; balance unchanged"
            );
            return Err(LedgerError::TransferFailed(e.to_string()));
        }

        let new_balance = available - amount;
        state.balances.insert(account.clone(), new_balance);

        self.journal.append(LedgerEvent::Withdrawal {
            account: account.clone(),
            amount,
        });

        info!(
            caller = %caller,
            account = %account,
            amount = %amount,
            balance = %new_balance,
            "Withdrawal settled"
        );

        Ok(new_balance)
    }

    /// Grant withdrawal rights to `agent`. Owner-only.
    ///
    /// Idempotent state-wise; every successful call emits an event.
    #[instrument(skip(self))]
    pub async fn authorize_agent(&self, caller: &Address, agent: &Address) -> Result<()> {
        let mut state = self.state.lock().await;

        require_owner(&state, caller, "authorize agents")?;
        if agent.is_null() {
            return Err(LedgerError::InvalidArgument(
                "agent must not be the null identity".to_string(),
            ));
        }

        state.agents.insert(agent.clone());

        self.journal.append(LedgerEvent::AgentAuthorized {
            agent: agent.clone(),
        });

        info!(agent = %agent, "Agent authorized");

        Ok(())
    }

    /// Revoke withdrawal rights from `agent`. Owner-only.
    ///
    /// Deauthorizing an unknown or null agent is harmless and succeeds.
    #[instrument(skip(self))]
    pub async fn deauthorize_agent(&self, caller: &Address, agent: &Address) -> Result<()> {
        let mut state = self.state.lock().await;

        require_owner(&state, caller, "deauthorize agents")?;

        state.agents.remove(agent);

        self.journal.append(LedgerEvent::AgentDeauthorized {
            agent: agent.clone(),
        });

        info!(agent = %agent, "Agent deauthorized");

        Ok(())
    }

    /// Hand ownership to `new_owner`. Owner-only.
    #[instrument(skip(self))]
    pub async fn transfer_ownership(&self, caller: &Address, new_owner: &Address) -> Result<()> {
        let mut state = self.state.lock().await;

        require_owner(&state, caller, "transfer ownership")?;
        if new_owner.is_null() {
            return Err(LedgerError::InvalidArgument(
                "new owner must not be the null identity".to_string(),
            ));
        }

        state.owner = new_owner.clone();

        info!(previous = %caller, owner = %new_owner, "Ownership transferred");

        Ok(())
    }

    /// Get the recorded balance of `account`. Zero for unknown accounts.
    pub async fn balance_of(&self, account: &Address) -> Units {
        let state = self.state.lock().await;
        state.balances.get(account).copied().unwrap_or(0)
    }

    /// Check if `account` is a currently-authorized agent.
    pub async fn is_agent(&self, account: &Address) -> bool {
        let state = self.state.lock().await;
        state.agents.contains(account)
    }

    /// Get the current owner.
    pub async fn current_owner(&self) -> Address {
        let state = self.state.lock().await;
        state.owner.clone()
    }

    /// The journal this ledger commits events to.
    pub fn journal(&self) -> &Arc<EventJournal> {
        &self.journal
    }
}

fn require_account(account: &Address) -> Result<()> {
    if account.is_null() {
        return Err(LedgerError::InvalidArgument(
            "account must not be the null identity".to_string(),
        ));
    }
    Ok(())
}

fn require_positive(amount: Units) -> Result<()> {
    if amount == 0 {
        return Err(LedgerError::InvalidArgument(
            "amount must be strictly positive".to_string(),
        ));
    }
    Ok(())
}

fn require_owner(state: &LedgerState, caller: &Address, action: &'static str) -> Result<()> {
    if !CallerRole::resolve(caller, &state.owner, &state.agents).is_owner() {
        return Err(LedgerError::Unauthorized {
            caller: caller.clone(),
            action,
        });
    }
    Ok(())
}
