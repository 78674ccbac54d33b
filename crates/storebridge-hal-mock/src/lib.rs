//! Mock HAL implementation for testing StoreBridge
//!
//! This provides a mock implementation of the HAL traits that can be used
//! for unit testing the bridge without a browser.
//!
//! - [`MockHal`] is a single page: in-memory slot store, a task queue that
//!   only runs when the test drains it, and a captured debug log.
//! - [`MockBrowser`] opens several pages over one shared store and delivers
//!   storage change notifications to every page except the writer.

#![no_std]
extern crate alloc;

use alloc::collections::{BTreeMap, VecDeque};
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use storebridge_hal::{
    BridgeHal, DeferredTask, HalError, SlotStorage, StorageArea, StorageChange, TaskQueue,
};

type SharedStore = Rc<RefCell<BTreeMap<String, String>>>;
type Inbox = Rc<RefCell<Vec<StorageChange>>>;

/// Pages registered with a [`MockBrowser`]
struct BrowserShared {
    /// (page id, that page's notification inbox)
    pages: Vec<(usize, Inbox)>,
}

/// Mock HAL for unit testing
///
/// Simulates one browser page.
pub struct MockHal {
    /// Page id (unique within a `MockBrowser`)
    page_id: usize,
    /// Area reported by `SlotStorage::area`
    area: StorageArea,
    /// Slot store (shared between pages of one browser)
    store: SharedStore,
    /// Pending deferred tasks
    tasks: RefCell<VecDeque<DeferredTask>>,
    /// Captured debug messages
    debug_log: RefCell<Vec<String>>,
    /// Storage change notifications received from other pages
    inbox: Inbox,
    /// Browser this page belongs to
    browser: Option<Rc<RefCell<BrowserShared>>>,
    /// Maximum total size of keys + values in bytes
    quota: Cell<Option<usize>>,
    /// Fail every storage call with `HalError::Unavailable`
    unavailable: Cell<bool>,
    /// Make `post` fail with `HalError::SchedulingFailed`
    reject_tasks: Cell<bool>,
    /// Number of tasks run so far
    tasks_run: Cell<usize>,
}

impl MockHal {
    /// Create a standalone mock page with its own empty store
    pub fn new() -> Self {
        Self::with_store(0, Rc::new(RefCell::new(BTreeMap::new())), None)
    }

    /// Create a standalone mock page whose store holds `key = value`
    pub fn with_item(key: &str, value: &str) -> Self {
        let hal = Self::new();
        hal.seed_item(key, value);
        hal
    }

    fn with_store(
        page_id: usize,
        store: SharedStore,
        browser: Option<Rc<RefCell<BrowserShared>>>,
    ) -> Self {
        Self {
            page_id,
            area: StorageArea::Local,
            store,
            tasks: RefCell::new(VecDeque::new()),
            debug_log: RefCell::new(Vec::new()),
            inbox: Rc::new(RefCell::new(Vec::new())),
            browser,
            quota: Cell::new(None),
            unavailable: Cell::new(false),
            reject_tasks: Cell::new(false),
            tasks_run: Cell::new(0),
        }
    }

    /// Report a different storage area (e.g. to model `sessionStorage`)
    pub fn with_area(mut self, area: StorageArea) -> Self {
        self.area = area;
        self
    }

    /// Page id within the owning browser
    pub fn page_id(&self) -> usize {
        self.page_id
    }

    // === Storage control ===

    /// Put a value directly into the store, bypassing notifications
    pub fn seed_item(&self, key: &str, value: &str) {
        self.store
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    /// Read a value directly from the store
    pub fn raw_item(&self, key: &str) -> Option<String> {
        self.store.borrow().get(key).cloned()
    }

    /// Number of keys in the store
    pub fn item_count(&self) -> usize {
        self.store.borrow().len()
    }

    /// Limit total stored bytes (keys + values); `None` removes the limit
    pub fn set_quota(&self, bytes: Option<usize>) {
        self.quota.set(bytes);
    }

    /// Make every storage call fail with `HalError::Unavailable`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.set(unavailable);
    }

    /// Make `post` fail with `HalError::SchedulingFailed`
    pub fn set_reject_tasks(&self, reject: bool) {
        self.reject_tasks.set(reject);
    }

    // === Task queue control ===

    /// Number of tasks waiting to run
    pub fn pending_task_count(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// Total tasks run so far
    pub fn tasks_run(&self) -> usize {
        self.tasks_run.get()
    }

    /// Run the oldest pending task; returns false if the queue was empty
    pub fn run_next_task(&self) -> bool {
        // Release the borrow before running so the task may post more work
        let task = self.tasks.borrow_mut().pop_front();
        match task {
            Some(task) => {
                task();
                self.tasks_run.set(self.tasks_run.get() + 1);
                true
            }
            None => false,
        }
    }

    /// Run tasks until the queue is empty, returning how many ran
    pub fn run_pending(&self) -> usize {
        let mut count = 0;
        while self.run_next_task() {
            count += 1;
        }
        count
    }

    // === Notifications ===

    /// Take all storage change notifications delivered to this page
    pub fn take_storage_events(&self) -> Vec<StorageChange> {
        core::mem::take(&mut *self.inbox.borrow_mut())
    }

    /// Number of undelivered storage change notifications
    pub fn storage_event_count(&self) -> usize {
        self.inbox.borrow().len()
    }

    // === Debug log ===

    /// Get all captured debug messages
    pub fn debug_log(&self) -> Vec<String> {
        self.debug_log.borrow().clone()
    }

    /// Clear the debug log
    pub fn clear_debug_log(&self) {
        self.debug_log.borrow_mut().clear();
    }

    /// Check if a specific message was logged
    pub fn has_log_containing(&self, substr: &str) -> bool {
        self.debug_log
            .borrow()
            .iter()
            .any(|msg| msg.contains(substr))
    }

    fn check_available(&self) -> Result<(), HalError> {
        if self.unavailable.get() {
            Err(HalError::Unavailable)
        } else {
            Ok(())
        }
    }

    fn stored_bytes_with(&self, key: &str, value: &str) -> usize {
        self.store
            .borrow()
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum::<usize>()
            + key.len()
            + value.len()
    }

    /// Deliver a change notification to every other page of the browser
    fn broadcast(&self, key: &str, old_value: Option<String>, new_value: Option<String>) {
        // Browsers only notify when the stored value actually changed
        if old_value == new_value {
            return;
        }
        let Some(browser) = &self.browser else {
            return;
        };
        for (page_id, inbox) in browser.borrow().pages.iter() {
            if *page_id == self.page_id {
                continue;
            }
            inbox.borrow_mut().push(
                StorageChange::new(self.area, key, old_value.clone(), new_value.clone())
                    .with_url(alloc::format!("mock://page/{}", self.page_id)),
            );
        }
    }
}

impl Default for MockHal {
    fn default() -> Self {
        Self::new()
    }
}

impl SlotStorage for MockHal {
    fn get_item(&self, key: &str) -> Result<Option<String>, HalError> {
        self.check_available()?;
        Ok(self.store.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), HalError> {
        self.check_available()?;
        if let Some(limit) = self.quota.get() {
            if self.stored_bytes_with(key, value) > limit {
                return Err(HalError::QuotaExceeded);
            }
        }
        let old = self
            .store
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.broadcast(key, old, Some(value.to_string()));
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), HalError> {
        self.check_available()?;
        let old = self.store.borrow_mut().remove(key);
        self.broadcast(key, old, None);
        Ok(())
    }

    fn area(&self) -> StorageArea {
        self.area
    }
}

impl TaskQueue for MockHal {
    fn post(&self, task: DeferredTask) -> Result<(), HalError> {
        if self.reject_tasks.get() {
            return Err(HalError::SchedulingFailed);
        }
        self.tasks.borrow_mut().push_back(task);
        Ok(())
    }
}

impl BridgeHal for MockHal {
    fn debug_write(&self, msg: &str) {
        self.debug_log.borrow_mut().push(msg.to_string());
    }
}

/// Simulated browser with several pages of one origin
///
/// All pages share one `localStorage`. A write in one page is reported to
/// every other open page through its storage event inbox.
pub struct MockBrowser {
    store: SharedStore,
    shared: Rc<RefCell<BrowserShared>>,
    next_page_id: Cell<usize>,
}

impl MockBrowser {
    /// Create a browser with an empty store and no pages
    pub fn new() -> Self {
        Self {
            store: Rc::new(RefCell::new(BTreeMap::new())),
            shared: Rc::new(RefCell::new(BrowserShared { pages: Vec::new() })),
            next_page_id: Cell::new(1),
        }
    }

    /// Open a new page sharing this browser's store
    pub fn open_page(&self) -> MockHal {
        let page_id = self.next_page_id.get();
        self.next_page_id.set(page_id + 1);
        let hal = MockHal::with_store(page_id, self.store.clone(), Some(self.shared.clone()));
        self.shared
            .borrow_mut()
            .pages
            .push((page_id, hal.inbox.clone()));
        hal
    }

    /// Close a page; it stops receiving notifications
    pub fn close_page(&self, page_id: usize) {
        self.shared
            .borrow_mut()
            .pages
            .retain(|(id, _)| *id != page_id);
    }

    /// Number of open pages
    pub fn page_count(&self) -> usize {
        self.shared.borrow().pages.len()
    }

    /// Read a value directly from the shared store
    pub fn raw_item(&self, key: &str) -> Option<String> {
        self.store.borrow().get(key).cloned()
    }

    /// Put a value directly into the shared store, without notifications
    pub fn seed_item(&self, key: &str, value: &str) {
        self.store
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }
}

impl Default for MockBrowser {
    fn default() -> Self {
        Self::new()
    }
}
