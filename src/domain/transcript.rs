#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EntryKind {
    UserInput,
    SystemMessage,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TranscriptEntry {
    pub kind: EntryKind,
    pub text: String,
    pub sequence_id: u64,
}

/// Append-only log of what the terminal has shown.
///
/// Entries are never edited in place. `clear` drops every entry at once but
/// keeps the sequence counter running, so ids stay unique for the whole
/// session.
#[derive(Clone, Debug, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
    next_sequence_id: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, text: &str) -> u64 {
        self.push(EntryKind::UserInput, text)
    }

    pub fn push_system(&mut self, text: &str) -> u64 {
        self.push(EntryKind::SystemMessage, text)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    #[cfg(test)]
    pub fn system_texts(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|entry| entry.kind == EntryKind::SystemMessage)
            .map(|entry| entry.text.as_str())
    }

    fn push(&mut self, kind: EntryKind, text: &str) -> u64 {
        let sequence_id = self.next_sequence_id;
        self.next_sequence_id += 1;
        self.entries.push(TranscriptEntry {
            kind,
            text: text.to_string(),
            sequence_id,
        });
        sequence_id
    }
}
