use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::scroll::{FilterState, IncludeSwitch, ItemId, ReadFilter};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct ItemFlags: u32 {
        const SEEN = 0b00000001;
        const SPAM = 0b00000010;
        const TRASH = 0b00000100;
    }
}

/// One conversation or message as the in-memory mailbox stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailItem {
    pub id: ItemId,
    pub subject: String,
    pub from_addr: String,
    /// Unix timestamp (seconds)
    pub date: i64,
    pub flags: ItemFlags,
}

impl MailItem {
    pub fn new(id: impl Into<ItemId>, subject: impl Into<String>, date: i64) -> Self {
        Self {
            id: id.into(),
            subject: subject.into(),
            from_addr: String::new(),
            date,
            flags: ItemFlags::empty(),
        }
    }

    pub fn with_flags(mut self, flags: ItemFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_from(mut self, from_addr: impl Into<String>) -> Self {
        self.from_addr = from_addr.into();
        self
    }

    pub fn is_seen(&self) -> bool {
        self.flags.contains(ItemFlags::SEEN)
    }

    pub fn is_spam_or_trash(&self) -> bool {
        self.flags.intersects(ItemFlags::SPAM | ItemFlags::TRASH)
    }

    /// Whether the item is visible under `filters`.
    pub fn matches(&self, filters: &FilterState) -> bool {
        let read_ok = match filters.read {
            ReadFilter::All => true,
            ReadFilter::Unread => !self.is_seen(),
        };
        let include_ok = match filters.include {
            IncludeSwitch::Default => !self.is_spam_or_trash(),
            IncludeSwitch::WithSpamAndTrash => true,
        };
        read_ok && include_ok
    }
}
