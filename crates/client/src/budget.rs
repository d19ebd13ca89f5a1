//! Budget sheet editing.
//!
//! Typing into a cell restarts that cell's autosave timer; the save fires once
//! the cell has been idle for the configured delay. Leaving the cell saves at
//! once. Text typed but not yet saved is mirrored to a JSON file so it
//! survives a restart.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use contracts::domain::budget::{
    AutosuggestData, AutosuggestResponse, Budget, BudgetCreate, BudgetListResponse,
    BudgetResponse, BudgetSummary, BudgetUpdate, GeneratedBudgetsResponse,
};
use contracts::domain::sales::SaleRow;
use contracts::domain::salesperson::Salesperson;
use contracts::shared::keys::{budget_key, cell_key};
use contracts::shared::quarter::Quarter;
use contracts::shared::response::MessageResponse;
use tokio::task::JoinHandle;

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Budget endpoints of one salesperson
#[async_trait]
pub trait BudgetBackend: Send + Sync + 'static {
    async fn list_budgets(&self) -> ClientResult<Vec<Budget>>;
    async fn create_budget(&self, budget: &BudgetCreate) -> ClientResult<Budget>;
    async fn update_budget(&self, id: i64, changes: &BudgetUpdate) -> ClientResult<Budget>;
    async fn delete_budget(&self, id: i64) -> ClientResult<()>;
    async fn generate_from_sales(&self) -> ClientResult<Vec<Budget>>;
    async fn autosuggest(&self) -> ClientResult<AutosuggestData>;
}

#[async_trait]
impl<T: BudgetBackend + ?Sized> BudgetBackend for Arc<T> {
    async fn list_budgets(&self) -> ClientResult<Vec<Budget>> {
        (**self).list_budgets().await
    }

    async fn create_budget(&self, budget: &BudgetCreate) -> ClientResult<Budget> {
        (**self).create_budget(budget).await
    }

    async fn update_budget(&self, id: i64, changes: &BudgetUpdate) -> ClientResult<Budget> {
        (**self).update_budget(id, changes).await
    }

    async fn delete_budget(&self, id: i64) -> ClientResult<()> {
        (**self).delete_budget(id).await
    }

    async fn generate_from_sales(&self) -> ClientResult<Vec<Budget>> {
        (**self).generate_from_sales().await
    }

    async fn autosuggest(&self) -> ClientResult<AutosuggestData> {
        (**self).autosuggest().await
    }
}

/// The signed-in salesperson's own budgets
#[async_trait]
impl BudgetBackend for ApiClient {
    async fn list_budgets(&self) -> ClientResult<Vec<Budget>> {
        let response: BudgetListResponse = self.get("/api/budget").await?;
        Ok(response.data)
    }

    async fn create_budget(&self, budget: &BudgetCreate) -> ClientResult<Budget> {
        let response: BudgetResponse = self.post("/api/budget", budget).await?;
        Ok(response.data)
    }

    async fn update_budget(&self, id: i64, changes: &BudgetUpdate) -> ClientResult<Budget> {
        let response: BudgetResponse = self.put(&format!("/api/budget/{}", id), changes).await?;
        Ok(response.data)
    }

    async fn delete_budget(&self, id: i64) -> ClientResult<()> {
        let _: MessageResponse = self.delete(&format!("/api/budget/{}", id)).await?;
        Ok(())
    }

    async fn generate_from_sales(&self) -> ClientResult<Vec<Budget>> {
        let response: GeneratedBudgetsResponse =
            self.post_empty("/api/budget/generate-from-sales").await?;
        tracing::info!("{}", response.message);
        Ok(response.data)
    }

    async fn autosuggest(&self) -> ClientResult<AutosuggestData> {
        let response: AutosuggestResponse = self.get("/api/budget/autosuggest").await?;
        Ok(response.data)
    }
}

/// Budgets of another salesperson, through the admin routes
pub struct SalespersonBudgets {
    api: ApiClient,
    salesperson_id: i64,
}

impl SalespersonBudgets {
    pub fn new(api: ApiClient, salesperson_id: i64) -> Self {
        Self {
            api,
            salesperson_id,
        }
    }
}

#[async_trait]
impl BudgetBackend for SalespersonBudgets {
    async fn list_budgets(&self) -> ClientResult<Vec<Budget>> {
        let response: BudgetListResponse = self
            .api
            .get(&format!("/api/budget/{}", self.salesperson_id))
            .await?;
        Ok(response.data)
    }

    async fn create_budget(&self, budget: &BudgetCreate) -> ClientResult<Budget> {
        let response: BudgetResponse = self
            .api
            .post(&format!("/api/budget/{}", self.salesperson_id), budget)
            .await?;
        Ok(response.data)
    }

    async fn update_budget(&self, id: i64, changes: &BudgetUpdate) -> ClientResult<Budget> {
        let response: BudgetResponse = self
            .api
            .put(
                &format!("/api/budget/{}/{}", self.salesperson_id, id),
                changes,
            )
            .await?;
        Ok(response.data)
    }

    async fn delete_budget(&self, id: i64) -> ClientResult<()> {
        let _: MessageResponse = self
            .api
            .delete(&format!("/api/budget/{}/{}", self.salesperson_id, id))
            .await?;
        Ok(())
    }

    async fn generate_from_sales(&self) -> ClientResult<Vec<Budget>> {
        let response: GeneratedBudgetsResponse = self
            .api
            .post_empty(&format!("/api/budget/{}/generate-from-sales", self.salesperson_id))
            .await?;
        tracing::info!("{}", response.message);
        Ok(response.data)
    }

    async fn autosuggest(&self) -> ClientResult<AutosuggestData> {
        self.api.autosuggest().await
    }
}

/// The brand/flag/customer a budget row is about
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BudgetTarget {
    pub brand: Option<String>,
    pub flag: Option<String>,
    pub customer_name: Option<String>,
    pub customer_class: Option<String>,
}

impl BudgetTarget {
    pub fn of_sale(row: &SaleRow) -> Self {
        Self {
            brand: row.brand.clone(),
            flag: row.flag.clone(),
            customer_name: row.customer_name.clone(),
            customer_class: row.derived_customer_class.clone(),
        }
    }

    pub fn of_budget(budget: &Budget) -> Self {
        Self {
            brand: budget.brand.clone(),
            flag: budget.flag.clone(),
            customer_name: budget.customer_name.clone(),
            customer_class: Some(budget.customer_class.clone()),
        }
    }

    pub fn key(&self) -> String {
        budget_key(
            self.brand.as_deref(),
            self.flag.as_deref(),
            self.customer_name.as_deref(),
        )
    }

    pub fn cell(&self, quarter: Quarter) -> String {
        cell_key(&self.key(), quarter)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStatus {
    Idle,
    Saving,
    /// Saved recently; reverts to `Idle` after the flash period
    Saved,
}

/// Empty and `"0"` inputs are never autosaved nor kept as pending
fn is_blank(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value == "0"
}

fn parse_amount(value: &str) -> f64 {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Unsaved cell input keyed by cell key, stored as a JSON object
#[derive(Debug, Clone)]
pub struct PendingStore {
    path: Option<PathBuf>,
}

impl PendingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn in_memory() -> Self {
        Self { path: None }
    }

    pub fn load(&self) -> HashMap<String, String> {
        let Some(path) = &self.path else {
            return HashMap::new();
        };
        let Ok(contents) = std::fs::read_to_string(path) else {
            return HashMap::new();
        };
        serde_json::from_str(&contents).unwrap_or_else(|e| {
            tracing::warn!(
                "Error loading pending changes from {}: {}",
                path.display(),
                e
            );
            HashMap::new()
        })
    }

    /// Write `changes`; an empty map removes the file
    pub fn save(&self, changes: &HashMap<String, String>) -> ClientResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if changes.is_empty() {
            return self.clear();
        }
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, serde_json::to_string(changes)?)?;
        Ok(())
    }

    pub fn clear(&self) -> ClientResult<()> {
        if let Some(path) = &self.path {
            match std::fs::remove_file(path) {
                Err(e) if e.kind() != std::io::ErrorKind::NotFound => return Err(e.into()),
                _ => {}
            }
        }
        Ok(())
    }
}

/// Fields of a manually added budget row
#[derive(Debug, Clone, Default)]
pub struct CustomBudgetInput {
    pub brand: Option<String>,
    pub flag: Option<String>,
    pub customer_name: Option<String>,
    pub customer_class: Option<String>,
}

#[derive(Default)]
struct SheetState {
    budgets: Vec<Budget>,
    inputs: HashMap<String, String>,
    saving: HashSet<String>,
    /// Cell -> sequence number of its latest successful save
    saved: HashMap<String, u64>,
    save_seq: u64,
}

struct Inner<B> {
    backend: B,
    owner: Option<Salesperson>,
    state: Mutex<SheetState>,
    timers: Mutex<HashMap<String, JoinHandle<()>>>,
    /// One lock per budget key; saves of the same row run one at a time
    row_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
    pending: PendingStore,
    autosave_delay: Duration,
    saved_flash: Duration,
}

impl<B> Inner<B> {
    fn state(&self) -> MutexGuard<'_, SheetState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn timers(&self) -> MutexGuard<'_, HashMap<String, JoinHandle<()>>> {
        self.timers.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn row_lock(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.row_locks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(key.to_string())
            .or_default()
            .clone()
    }
}

/// Budgets of one salesperson plus the state of every cell being edited.
///
/// Cloning is cheap and shares the sheet. Editing methods spawn timers and
/// must be called inside a Tokio runtime.
pub struct BudgetEditor<B: BudgetBackend> {
    inner: Arc<Inner<B>>,
}

impl<B: BudgetBackend> Clone for BudgetEditor<B> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<B: BudgetBackend> BudgetEditor<B> {
    /// `owner` is the salesperson new budget rows are created for
    pub fn new(backend: B, owner: Option<Salesperson>, config: &ClientConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                backend,
                owner,
                state: Mutex::new(SheetState::default()),
                timers: Mutex::new(HashMap::new()),
                row_locks: Mutex::new(HashMap::new()),
                pending: PendingStore::new(config.pending_changes_path()),
                autosave_delay: config.autosave_delay,
                saved_flash: config.saved_flash,
            }),
        }
    }

    pub async fn load(&self) -> ClientResult<()> {
        let budgets = self.inner.backend.list_budgets().await.map_err(|e| {
            tracing::error!("Error fetching budget data: {}", e);
            e
        })?;
        self.inner.state().budgets = budgets;
        Ok(())
    }

    pub fn budgets(&self) -> Vec<Budget> {
        self.inner.state().budgets.clone()
    }

    pub fn budget_for(&self, target: &BudgetTarget) -> Option<Budget> {
        let key = target.key();
        self.inner
            .state()
            .budgets
            .iter()
            .find(|b| b.key() == key)
            .cloned()
    }

    pub fn custom_budgets(&self) -> Vec<Budget> {
        self.inner
            .state()
            .budgets
            .iter()
            .filter(|b| b.is_custom)
            .cloned()
            .collect()
    }

    pub fn summary(&self) -> BudgetSummary {
        BudgetSummary::from_budgets(&self.inner.state().budgets)
    }

    pub fn quarter_total(&self, quarter: Quarter) -> f64 {
        self.inner
            .state()
            .budgets
            .iter()
            .map(|b| b.quarter(quarter))
            .sum()
    }

    /// Text to show in a cell: unsaved input first, then the stored amount
    pub fn display_value(&self, target: &BudgetTarget, quarter: Quarter) -> String {
        let cell = target.cell(quarter);
        let key = target.key();
        let state = self.inner.state();
        if let Some(input) = state.inputs.get(&cell) {
            return input.clone();
        }
        match state.budgets.iter().find(|b| b.key() == key) {
            Some(b) if b.quarter(quarter) != 0.0 => b.quarter(quarter).to_string(),
            _ => String::new(),
        }
    }

    pub fn cell_status(&self, target: &BudgetTarget, quarter: Quarter) -> CellStatus {
        let cell = target.cell(quarter);
        let state = self.inner.state();
        if state.saving.contains(&cell) {
            CellStatus::Saving
        } else if state.saved.contains_key(&cell) {
            CellStatus::Saved
        } else {
            CellStatus::Idle
        }
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.inner.state().inputs.is_empty()
    }

    /// Record typed text and restart the cell's autosave timer
    pub fn input(&self, target: &BudgetTarget, quarter: Quarter, value: &str) {
        let cell = target.cell(quarter);
        self.inner
            .state()
            .inputs
            .insert(cell.clone(), value.to_string());
        self.persist_pending();

        let mut timers = self.inner.timers();
        if let Some(previous) = timers.remove(&cell) {
            previous.abort();
        }
        if is_blank(value) {
            return;
        }

        let editor = self.clone();
        let target = target.clone();
        let value = value.to_string();
        let delay = self.inner.autosave_delay;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // detached so a later keystroke cannot cancel a request in flight
            tokio::spawn(async move {
                let _ = editor.save_cell(&target, quarter, &value).await;
            });
        });
        timers.insert(cell, timer);
    }

    /// Leaving a cell cancels its timer and saves immediately
    pub async fn blur(
        &self,
        target: &BudgetTarget,
        quarter: Quarter,
        value: &str,
    ) -> ClientResult<Budget> {
        self.cancel_timer(&target.cell(quarter));
        self.save_cell(target, quarter, value).await
    }

    /// Save one quarter of a row: update its budget, or create the budget
    /// when the row has none yet.
    ///
    /// Saves of cells in the same row wait for each other, so a row gets at
    /// most one create and later quarters update the created budget.
    pub async fn save_cell(
        &self,
        target: &BudgetTarget,
        quarter: Quarter,
        value: &str,
    ) -> ClientResult<Budget> {
        let amount = parse_amount(value);
        let key = target.key();
        let cell = cell_key(&key, quarter);

        self.inner.state().saving.insert(cell.clone());
        let row_lock = self.inner.row_lock(&key);
        let _row = row_lock.lock().await;

        let existing = self
            .inner
            .state()
            .budgets
            .iter()
            .find(|b| b.key() == key)
            .map(|b| b.id);

        let result = match existing {
            Some(id) => {
                self.inner
                    .backend
                    .update_budget(id, &BudgetUpdate::for_quarter(quarter, amount))
                    .await
            }
            None => match self.new_budget(target, quarter, amount) {
                Ok(create) => self.inner.backend.create_budget(&create).await,
                Err(e) => Err(e),
            },
        };

        let mut state = self.inner.state();
        state.saving.remove(&cell);

        match result {
            Ok(saved) => {
                match state.budgets.iter_mut().find(|b| b.id == saved.id) {
                    Some(existing) => *existing = saved.clone(),
                    None => state.budgets.push(saved.clone()),
                }
                // keep newer text typed while the request was in flight
                if state.inputs.get(&cell).map(String::as_str) == Some(value) {
                    state.inputs.remove(&cell);
                }
                state.save_seq += 1;
                let seq = state.save_seq;
                state.saved.insert(cell.clone(), seq);
                drop(state);

                self.persist_pending();
                self.clear_flash_later(cell, seq);
                Ok(saved)
            }
            Err(e) => {
                tracing::error!("Error saving budget cell {}: {}", cell, e);
                Err(e)
            }
        }
    }

    fn new_budget(
        &self,
        target: &BudgetTarget,
        quarter: Quarter,
        amount: f64,
    ) -> ClientResult<BudgetCreate> {
        let owner = self.owner()?;
        let customer_class = if owner.is_hospitality() {
            "Hospitality".to_string()
        } else {
            target
                .customer_class
                .clone()
                .unwrap_or_else(|| "Unknown".to_string())
        };

        let mut create = BudgetCreate {
            salesperson_id: owner.salesman_no,
            salesperson_name: owner.salesman_name.clone(),
            brand: target.brand.clone(),
            flag: target.flag.clone(),
            customer_name: target.customer_name.clone(),
            customer_class,
            quarter_1_sales: 0.0,
            quarter_2_sales: 0.0,
            quarter_3_sales: 0.0,
            quarter_4_sales: 0.0,
            is_custom: false,
        };
        match quarter {
            Quarter::Q1 => create.quarter_1_sales = amount,
            Quarter::Q2 => create.quarter_2_sales = amount,
            Quarter::Q3 => create.quarter_3_sales = amount,
            Quarter::Q4 => create.quarter_4_sales = amount,
        }
        Ok(create)
    }

    fn owner(&self) -> ClientResult<&Salesperson> {
        self.inner
            .owner
            .as_ref()
            .ok_or_else(|| ClientError::Invalid("Salesperson data not available".to_string()))
    }

    fn clear_flash_later(&self, cell: String, seq: u64) {
        let inner = self.inner.clone();
        tokio::spawn(async move {
            tokio::time::sleep(inner.saved_flash).await;
            let mut state = inner.state();
            if state.saved.get(&cell) == Some(&seq) {
                state.saved.remove(&cell);
            }
        });
    }

    fn cancel_timer(&self, cell: &str) {
        if let Some(timer) = self.inner.timers().remove(cell) {
            timer.abort();
        }
    }

    /// Abort every scheduled autosave
    pub fn cancel_autosaves(&self) {
        for (_, timer) in self.inner.timers().drain() {
            timer.abort();
        }
    }

    fn persist_pending(&self) {
        let snapshot: HashMap<String, String> = self
            .inner
            .state()
            .inputs
            .iter()
            .filter(|(_, v)| !is_blank(v))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        if let Err(e) = self.inner.pending.save(&snapshot) {
            tracing::warn!("Error saving pending changes: {}", e);
        }
    }

    /// Bring back input left unsaved by a previous run; returns the cell count
    pub fn restore_pending(&self) -> usize {
        let restored = self.inner.pending.load();
        let count = restored.len();
        self.inner.state().inputs.extend(restored);
        count
    }

    pub fn discard_pending(&self) {
        self.inner.state().inputs.clear();
        if let Err(e) = self.inner.pending.clear() {
            tracing::warn!("Error clearing pending changes: {}", e);
        }
    }

    /// Add a manual budget row with all quarters at zero
    pub async fn create_custom(&self, input: CustomBudgetInput) -> ClientResult<Budget> {
        let owner = self.owner()?;
        let customer_class = match input.customer_class {
            Some(class) => class,
            None if owner.is_hospitality() => "Hospitality".to_string(),
            None => String::new(),
        };

        let create = BudgetCreate {
            salesperson_id: owner.salesman_no,
            salesperson_name: owner.salesman_name.clone(),
            brand: input.brand,
            flag: input.flag,
            customer_name: input.customer_name,
            customer_class,
            quarter_1_sales: 0.0,
            quarter_2_sales: 0.0,
            quarter_3_sales: 0.0,
            quarter_4_sales: 0.0,
            is_custom: true,
        };

        let budget = self.inner.backend.create_budget(&create).await.map_err(|e| {
            tracing::error!("Error creating custom budget: {}", e);
            e
        })?;
        self.inner.state().budgets.push(budget.clone());
        Ok(budget)
    }

    pub async fn delete_custom(&self, id: i64) -> ClientResult<()> {
        self.inner.backend.delete_budget(id).await.map_err(|e| {
            tracing::error!("Error deleting custom budget {}: {}", id, e);
            e
        })?;
        self.inner.state().budgets.retain(|b| b.id != id);
        Ok(())
    }

    /// Create budgets for sales rows that have none; returns how many were made
    pub async fn generate_from_sales(&self) -> ClientResult<usize> {
        let generated = self.inner.backend.generate_from_sales().await?;
        let count = generated.len();
        self.inner.state().budgets.extend(generated);
        Ok(count)
    }

    pub async fn autosuggest(&self) -> ClientResult<AutosuggestData> {
        self.inner.backend.autosuggest().await.map_err(|e| {
            tracing::error!("Error fetching autosuggest data: {}", e);
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
    use tokio::time::sleep;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Create {
            customer_name: Option<String>,
            customer_class: String,
            quarters: [f64; 4],
            is_custom: bool,
        },
        Update(i64, BudgetUpdate),
        Delete(i64),
    }

    #[derive(Default)]
    struct FakeBackend {
        budgets: Mutex<Vec<Budget>>,
        calls: Mutex<Vec<Call>>,
        next_id: AtomicI64,
        fail: AtomicBool,
        /// Milliseconds each create or update takes
        latency_ms: AtomicU64,
    }

    impl FakeBackend {
        fn with(budgets: Vec<Budget>) -> Arc<Self> {
            let fake = Self::default();
            fake.next_id.store(100, Ordering::SeqCst);
            *fake.budgets.lock().unwrap() = budgets;
            Arc::new(fake)
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        async fn respond(&self) -> ClientResult<()> {
            let latency = self.latency_ms.load(Ordering::SeqCst);
            if latency > 0 {
                sleep(Duration::from_millis(latency)).await;
            }
            self.check()
        }

        fn check(&self) -> ClientResult<()> {
            if self.fail.load(Ordering::SeqCst) {
                Err(ClientError::Http {
                    status: 500,
                    detail: "boom".into(),
                })
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl BudgetBackend for FakeBackend {
        async fn list_budgets(&self) -> ClientResult<Vec<Budget>> {
            Ok(self.budgets.lock().unwrap().clone())
        }

        async fn create_budget(&self, c: &BudgetCreate) -> ClientResult<Budget> {
            self.respond().await?;
            self.calls.lock().unwrap().push(Call::Create {
                customer_name: c.customer_name.clone(),
                customer_class: c.customer_class.clone(),
                quarters: [
                    c.quarter_1_sales,
                    c.quarter_2_sales,
                    c.quarter_3_sales,
                    c.quarter_4_sales,
                ],
                is_custom: c.is_custom,
            });
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            let mut b = budget(id, c.customer_name.as_deref());
            b.customer_class = c.customer_class.clone();
            b.brand = c.brand.clone();
            b.flag = c.flag.clone();
            b.quarter_1_sales = c.quarter_1_sales;
            b.quarter_2_sales = c.quarter_2_sales;
            b.quarter_3_sales = c.quarter_3_sales;
            b.quarter_4_sales = c.quarter_4_sales;
            b.is_custom = c.is_custom;
            b.recompute_total();
            self.budgets.lock().unwrap().push(b.clone());
            Ok(b)
        }

        async fn update_budget(&self, id: i64, changes: &BudgetUpdate) -> ClientResult<Budget> {
            self.respond().await?;
            self.calls
                .lock()
                .unwrap()
                .push(Call::Update(id, changes.clone()));
            let mut budgets = self.budgets.lock().unwrap();
            let b = budgets
                .iter_mut()
                .find(|b| b.id == id)
                .ok_or(ClientError::NoData)?;
            b.apply(changes);
            Ok(b.clone())
        }

        async fn delete_budget(&self, id: i64) -> ClientResult<()> {
            self.check()?;
            self.calls.lock().unwrap().push(Call::Delete(id));
            self.budgets.lock().unwrap().retain(|b| b.id != id);
            Ok(())
        }

        async fn generate_from_sales(&self) -> ClientResult<Vec<Budget>> {
            Ok(vec![])
        }

        async fn autosuggest(&self) -> ClientResult<AutosuggestData> {
            Ok(AutosuggestData {
                customer_classes: vec!["Retail".into()],
                ..Default::default()
            })
        }
    }

    fn budget(id: i64, customer: Option<&str>) -> Budget {
        Budget {
            id,
            salesperson_id: 101,
            salesperson_name: "Ann".into(),
            brand: None,
            flag: None,
            customer_name: customer.map(String::from),
            customer_class: "Retail".into(),
            quarter_1_sales: 10.0,
            quarter_2_sales: 0.0,
            quarter_3_sales: 0.0,
            quarter_4_sales: 0.0,
            is_custom: false,
            total_sales: 10.0,
        }
    }

    fn owner(role: &str) -> Salesperson {
        Salesperson {
            salesman_no: 101,
            salesman_name: "Ann".into(),
            role: Some(role.into()),
        }
    }

    fn customer(name: &str) -> BudgetTarget {
        BudgetTarget {
            customer_name: Some(name.into()),
            customer_class: Some("Retail".into()),
            ..Default::default()
        }
    }

    fn config(dir: &tempfile::TempDir) -> ClientConfig {
        ClientConfig {
            storage_dir: dir.path().to_path_buf(),
            ..ClientConfig::default()
        }
    }

    async fn editor(
        dir: &tempfile::TempDir,
        role: &str,
        budgets: Vec<Budget>,
    ) -> (Arc<FakeBackend>, BudgetEditor<Arc<FakeBackend>>) {
        let backend = FakeBackend::with(budgets);
        let editor = BudgetEditor::new(backend.clone(), Some(owner(role)), &config(dir));
        editor.load().await.unwrap();
        (backend, editor)
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_edits_save_once_with_last_value() {
        let dir = tempfile::tempdir().unwrap();
        let (backend, editor) = editor(&dir, "Retail", vec![budget(1, Some("Acme"))]).await;
        let acme = customer("Acme");

        for value in ["1", "15", "150"] {
            editor.input(&acme, Quarter::Q2, value);
            sleep(Duration::from_millis(500)).await;
        }
        assert_eq!(editor.display_value(&acme, Quarter::Q2), "150");

        // last keystroke at 1000ms, so nothing is due before 3000ms
        sleep(Duration::from_millis(1400)).await;
        assert!(backend.calls().is_empty());

        sleep(Duration::from_millis(200)).await;
        assert_eq!(
            backend.calls(),
            vec![Call::Update(1, BudgetUpdate::for_quarter(Quarter::Q2, 150.0))]
        );
        assert_eq!(editor.budget_for(&acme).unwrap().quarter_2_sales, 150.0);
        assert_eq!(editor.cell_status(&acme, Quarter::Q2), CellStatus::Saved);
        assert!(!editor.has_pending_changes());

        sleep(Duration::from_millis(1000)).await;
        assert_eq!(editor.cell_status(&acme, Quarter::Q2), CellStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blur_saves_immediately_and_cancels_timer() {
        let dir = tempfile::tempdir().unwrap();
        let (backend, editor) = editor(&dir, "Retail", vec![budget(1, Some("Acme"))]).await;
        let acme = customer("Acme");

        editor.input(&acme, Quarter::Q3, "300");
        let saved = editor.blur(&acme, Quarter::Q3, "300").await.unwrap();
        assert_eq!(saved.quarter_3_sales, 300.0);
        assert_eq!(saved.total_sales, 310.0);

        sleep(Duration::from_secs(5)).await;
        assert_eq!(backend.calls().len(), 1);
        assert_eq!(editor.display_value(&acme, Quarter::Q3), "300");
        assert_eq!(editor.summary().total_q3, 300.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_and_zero_input_never_autosave() {
        let dir = tempfile::tempdir().unwrap();
        let (backend, editor) = editor(&dir, "Retail", vec![budget(1, Some("Acme"))]).await;
        let acme = customer("Acme");

        editor.input(&acme, Quarter::Q1, "5");
        editor.input(&acme, Quarter::Q1, "");
        editor.input(&acme, Quarter::Q2, "0");
        sleep(Duration::from_secs(5)).await;

        assert!(backend.calls().is_empty());
        let pending = PendingStore::new(config(&dir).pending_changes_path());
        assert!(pending.load().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_save_of_a_row_creates_its_budget() {
        let dir = tempfile::tempdir().unwrap();
        let (backend, editor) = editor(&dir, "Retail", vec![]).await;
        let beta = customer("Beta");

        editor.blur(&beta, Quarter::Q1, "75").await.unwrap();
        editor.blur(&beta, Quarter::Q2, "25").await.unwrap();

        let calls = backend.calls();
        assert_eq!(
            calls[0],
            Call::Create {
                customer_name: Some("Beta".into()),
                customer_class: "Retail".into(),
                quarters: [75.0, 0.0, 0.0, 0.0],
                is_custom: false,
            }
        );
        assert!(matches!(calls[1], Call::Update(100, _)));
        assert_eq!(editor.budgets().len(), 1);
        assert_eq!(editor.quarter_total(Quarter::Q2), 25.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_autosaves_of_a_new_row_create_one_budget() {
        let dir = tempfile::tempdir().unwrap();
        let (backend, editor) = editor(&dir, "Retail", vec![]).await;
        backend.latency_ms.store(1000, Ordering::SeqCst);
        let beta = customer("Beta");

        editor.input(&beta, Quarter::Q1, "75");
        sleep(Duration::from_millis(300)).await;
        editor.input(&beta, Quarter::Q2, "25");

        // Q2 fires while the Q1 create is still in flight
        sleep(Duration::from_millis(2500)).await;
        assert_eq!(editor.cell_status(&beta, Quarter::Q2), CellStatus::Saving);

        sleep(Duration::from_secs(5)).await;
        let calls = backend.calls();
        assert_eq!(calls.len(), 2);
        assert!(matches!(calls[0], Call::Create { .. }));
        assert_eq!(
            calls[1],
            Call::Update(100, BudgetUpdate::for_quarter(Quarter::Q2, 25.0))
        );
        assert_eq!(editor.budgets().len(), 1);
        assert_eq!(backend.budgets.lock().unwrap().len(), 1);
        assert_eq!(editor.display_value(&beta, Quarter::Q1), "75");
        assert_eq!(editor.display_value(&beta, Quarter::Q2), "25");
        assert!(!editor.has_pending_changes());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hospitality_rows_are_created_with_hospitality_class() {
        let dir = tempfile::tempdir().unwrap();
        let (backend, editor) = editor(&dir, "Hospitality", vec![]).await;
        let hilton = BudgetTarget {
            brand: Some("Hilton".into()),
            flag: Some("Hampton".into()),
            ..Default::default()
        };

        editor.blur(&hilton, Quarter::Q4, "40").await.unwrap();

        match &backend.calls()[0] {
            Call::Create { customer_class, .. } => assert_eq!(customer_class, "Hospitality"),
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_input_is_restored_after_restart() {
        let dir = tempfile::tempdir().unwrap();
        let acme = customer("Acme");
        {
            let (_, editor) = editor(&dir, "Retail", vec![budget(1, Some("Acme"))]).await;
            editor.input(&acme, Quarter::Q4, "42");
            editor.cancel_autosaves();
        }

        let (backend, editor) = editor(&dir, "Retail", vec![budget(1, Some("Acme"))]).await;
        assert_eq!(editor.display_value(&acme, Quarter::Q4), "");
        assert_eq!(editor.restore_pending(), 1);
        assert_eq!(editor.display_value(&acme, Quarter::Q4), "42");

        editor.discard_pending();
        assert_eq!(editor.display_value(&acme, Quarter::Q4), "");
        assert!(backend.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_save_keeps_input() {
        let dir = tempfile::tempdir().unwrap();
        let (backend, editor) = editor(&dir, "Retail", vec![budget(1, Some("Acme"))]).await;
        let acme = customer("Acme");
        backend.fail.store(true, Ordering::SeqCst);

        editor.input(&acme, Quarter::Q1, "99");
        let result = editor.blur(&acme, Quarter::Q1, "99").await;

        assert!(matches!(result, Err(ClientError::Http { status: 500, .. })));
        assert_eq!(editor.cell_status(&acme, Quarter::Q1), CellStatus::Idle);
        assert_eq!(editor.display_value(&acme, Quarter::Q1), "99");
        assert_eq!(editor.budget_for(&acme).unwrap().quarter_1_sales, 10.0);
    }

    #[tokio::test]
    async fn test_custom_budget_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let (backend, editor) = editor(&dir, "Retail", vec![budget(1, Some("Acme"))]).await;

        let created = editor
            .create_custom(CustomBudgetInput {
                customer_name: Some("Prospect".into()),
                customer_class: Some("Dealer".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(
            backend.calls()[0],
            Call::Create {
                customer_name: Some("Prospect".into()),
                customer_class: "Dealer".into(),
                quarters: [0.0; 4],
                is_custom: true,
            }
        );
        assert_eq!(editor.custom_budgets().len(), 1);
        assert_eq!(editor.summary().custom_budgets, 1);

        editor.delete_custom(created.id).await.unwrap();
        assert!(editor.custom_budgets().is_empty());
        assert_eq!(backend.calls()[1], Call::Delete(created.id));
        let suggestions = editor.autosuggest().await.unwrap();
        assert_eq!(suggestions.customer_classes, vec!["Retail"]);
    }

    #[tokio::test]
    async fn test_editing_without_salesperson_fails() {
        let dir = tempfile::tempdir().unwrap();
        let editor = BudgetEditor::new(FakeBackend::with(vec![]), None, &config(&dir));

        let result = editor.blur(&customer("Acme"), Quarter::Q1, "10").await;
        let expected = "Salesperson data not available";
        assert!(matches!(result, Err(ClientError::Invalid(msg)) if msg == expected));
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount(" 12.5 "), 12.5);
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("abc"), 0.0);
        assert!(is_blank("0"));
        assert!(!is_blank("0.5"));
    }
}
