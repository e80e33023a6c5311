//! Change notification from the interaction layer to the host.

/// What a handler changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardChange {
    /// The selection set changed.
    Selection,
    /// Elements were added, removed, moved or reordered.
    Content,
    /// The camera moved or zoomed.
    View,
}

/// Set of changes accumulated since the host last looked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub selection: bool,
    pub content: bool,
    pub view: bool,
}

impl ChangeSet {
    pub fn insert(&mut self, change: BoardChange) {
        match change {
            BoardChange::Selection => self.selection = true,
            BoardChange::Content => self.content = true,
            BoardChange::View => self.view = true,
        }
    }

    pub fn contains(&self, change: BoardChange) -> bool {
        match change {
            BoardChange::Selection => self.selection,
            BoardChange::Content => self.content,
            BoardChange::View => self.view,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.selection || self.content || self.view)
    }
}

/// Handle returned by [`Notifier::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(BoardChange)>;

/// Fan-out of [`BoardChange`] events to subscribers.
#[derive(Default)]
pub struct Notifier {
    subscribers: Vec<(SubscriptionId, Callback)>,
    next_id: u64,
    pending: ChangeSet,
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("subscribers", &self.subscribers.len())
            .field("pending", &self.pending)
            .finish()
    }
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, callback: impl FnMut(BoardChange) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Returns false if the subscription was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    pub fn emit(&mut self, change: BoardChange) {
        self.pending.insert(change);
        for (_, callback) in &mut self.subscribers {
            callback(change);
        }
    }

    /// Changes emitted since the last call.
    pub fn take_pending(&mut self) -> ChangeSet {
        std::mem::take(&mut self.pending)
    }
}
