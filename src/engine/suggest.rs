use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::spawn;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::debug;

/// Quiet period after the last keystroke before suggestions are computed.
pub const SUGGESTION_DEBOUNCE: Duration = Duration::from_millis(150);

/// Queries shorter than this (in characters) produce no suggestions at all.
pub const MIN_QUERY_CHARS: usize = 3;

const DEFAULT_CATALOG: &[&str] = &[
    "Breakfast", "Lunch", "Dinner", "Snacks", "Groceries", "Restaurant", "Café / Coffee",
    "Rent", "Mortgage", "Home Maintenance", "Property Tax", "Home Insurance", "Furnishing", "Utilities",
    "Fuel", "Public Transport", "Taxi / Ride Share", "Vehicle Maintenance", "Vehicle Insurance", "Parking Fees", "Toll Charges",
    "Electricity", "Water", "Internet", "Mobile Bill", "Gas", "Cable", "TV Subscription", "OTT",
    "Clothing", "Electronics", "Accessories", "Gifts", "Home Items",
    "Medicines", "Doctor Visits", "Health Insurance", "Lab Tests", "GYM", "Yoga", "Sports",
    "Tuition Fees", "Books & Supplies", "Online Courses", "Coaching/Training",
    "Office Supplies", "Business Travel", "Subscriptions", "Client Meeting Expenses",
    "Movies", "Streaming Services", "Games", "Events & Shows", "Hobbies",
    "Flights", "Accommodation", "Local Transport", "Food (While Travel)", "Sightseeing",
    "Stocks", "Mutual Funds", "Crypto", "Fixed Deposits", "Real Estate",
    "Salon / Haircut", "Cosmetics", "Spa / Massage", "Toiletries",
    "Pet Food", "Veterinary", "Grooming", "Accessories",
    "Childcare", "Elder Care", "Gifts", "Anniversary", "Birthday",
    "Loan EMI", "Credit Card Payment", "Interest Paid",
    "Religious Offering", "NGO Donation", "Crowdfunding",
    "Uncategorized", "Lost Money", "Others",
];

/// The built-in list of expense categories offered while typing a description.
pub fn default_catalog() -> &'static [&'static str] {
    DEFAULT_CATALOG
}

/// Case-insensitive substring matches of `query` in `catalog`.
///
/// Entries starting with the query come first, then inner matches; within each
/// group catalog order is kept and repeated entries appear once.
pub fn suggest<S: AsRef<str>>(catalog: &[S], query: &str) -> Vec<String> {
    if query.chars().count() < MIN_QUERY_CHARS {
        return Vec::new();
    }

    let needle = query.to_lowercase();
    let mut seen = HashSet::new();
    let mut prefix_matches = Vec::new();
    let mut inner_matches = Vec::new();

    for entry in catalog.iter().map(AsRef::as_ref) {
        if !seen.insert(entry) {
            continue;
        }

        let haystack = entry.to_lowercase();

        if haystack.starts_with(&needle) {
            prefix_matches.push(entry.to_string());
        } else if haystack.contains(&needle) {
            inner_matches.push(entry.to_string());
        }
    }

    prefix_matches.extend(inner_matches);
    prefix_matches
}

/// The latest published suggestion list, tagged with the input generation that produced it.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct Suggestions {
    pub generation: u64,
    pub items: Vec<String>
}

/// Debounced front-end for [`suggest`].
///
/// Every call to [`input`](Suggester::input) starts a new generation, aborts the
/// pending computation and schedules a fresh one. A computation only publishes
/// if its generation is still the latest, so a late result can never replace a
/// newer one. Must be used from within a tokio runtime.
pub struct Suggester {
    catalog: Arc<[String]>,
    debounce: Duration,
    generation: Arc<AtomicU64>,
    pending: Option<JoinHandle<()>>,
    sender: Arc<watch::Sender<Suggestions>>
}

impl Suggester {
    pub fn new<I, S>(catalog: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let (sender, _) = watch::channel(Suggestions::default());

        Self {
            catalog: catalog.into_iter().map(Into::into).collect(),
            debounce: SUGGESTION_DEBOUNCE,
            generation: Arc::new(AtomicU64::new(0)),
            pending: None,
            sender: Arc::new(sender)
        }
    }

    pub fn with_default_catalog() -> Self {
        Self::new(default_catalog().iter().copied())
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<Suggestions> {
        self.sender.subscribe()
    }

    pub fn current(&self) -> Vec<String> {
        self.sender.borrow().items.clone()
    }

    /// Supersedes any pending computation and schedules one for `query`.
    pub fn input(&mut self, query: &str) {
        let generation = self.next_generation();

        let catalog = self.catalog.clone();
        let latest = self.generation.clone();
        let sender = self.sender.clone();
        let query = query.to_string();
        let debounce = self.debounce;

        self.pending = Some(spawn(async move {
            sleep(debounce).await;
            let items = suggest(&catalog[..], &query);
            publish(&sender, &latest, generation, items);
        }));
    }

    /// Drops pending work and publishes an empty list, e.g. once a suggestion was picked.
    pub fn clear(&mut self) {
        let generation = self.next_generation();
        publish(&self.sender, &self.generation, generation, Vec::new());
    }

    fn next_generation(&mut self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(pending) = self.pending.take() {
            pending.abort();
        }

        generation
    }
}

impl Drop for Suggester {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}

fn publish(sender: &watch::Sender<Suggestions>, latest: &AtomicU64, generation: u64, items: Vec<String>) {
    let published = sender.send_if_modified(|current| {
        //NOTE: Checked under the channel lock so two racing computations cannot publish out of order
        if latest.load(Ordering::SeqCst) != generation || current.generation >= generation {
            return false;
        }

        *current = Suggestions { generation, items };
        true
    });

    if !published {
        debug!("Discarded stale suggestions for generation [{generation}]");
    }
}
