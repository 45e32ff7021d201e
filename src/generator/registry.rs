use std::fmt;

/// The built-in generation strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StrategyKind {
    Genres,
    Folders,
    RecentlyAdded,
    Decades,
    SmartMix,
    Coverage,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 6] = [
        StrategyKind::Genres,
        StrategyKind::Folders,
        StrategyKind::RecentlyAdded,
        StrategyKind::Decades,
        StrategyKind::SmartMix,
        StrategyKind::Coverage,
    ];

    /// Stable name, also used as the playlists' `generated_by` tag.
    pub fn name(self) -> &'static str {
        match self {
            StrategyKind::Genres => "genres",
            StrategyKind::Folders => "folders",
            StrategyKind::RecentlyAdded => "recentlyAdded",
            StrategyKind::Decades => "decades",
            StrategyKind::SmartMix => "smartMix",
            StrategyKind::Coverage => "coverage",
        }
    }

    pub fn default_priority(self) -> i32 {
        match self {
            StrategyKind::Genres => 10,
            StrategyKind::Folders => 20,
            StrategyKind::RecentlyAdded => 30,
            StrategyKind::Decades => 40,
            StrategyKind::SmartMix => 50,
            StrategyKind::Coverage => 100,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorEntry {
    pub kind: StrategyKind,
    pub priority: i32,
    pub enabled: bool,
}

impl GeneratorEntry {
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}

/// Ordered, filterable set of strategies owned by one engine.
#[derive(Debug, Clone)]
pub struct Registry {
    entries: Vec<GeneratorEntry>,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            entries: StrategyKind::ALL
                .into_iter()
                .map(|kind| GeneratorEntry {
                    kind,
                    priority: kind.default_priority(),
                    enabled: true,
                })
                .collect(),
        }
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[GeneratorEntry] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&GeneratorEntry> {
        self.entries.iter().find(|e| e.name() == name)
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut GeneratorEntry> {
        self.entries.iter_mut().find(|e| e.name() == name)
    }

    /// Returns false when no strategy has that name.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> bool {
        match self.get_mut(name) {
            Some(entry) => {
                entry.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn enable(&mut self, name: &str) -> bool {
        self.set_enabled(name, true)
    }

    pub fn disable(&mut self, name: &str) -> bool {
        self.set_enabled(name, false)
    }

    pub fn set_priority(&mut self, name: &str, priority: i32) -> bool {
        match self.get_mut(name) {
            Some(entry) => {
                entry.priority = priority;
                true
            }
            None => false,
        }
    }

    /// Enabled strategies by ascending priority. Equal priorities keep
    /// registration order.
    pub fn ordered_enabled(&self) -> Vec<StrategyKind> {
        let mut enabled: Vec<&GeneratorEntry> = self.entries.iter().filter(|e| e.enabled).collect();
        enabled.sort_by_key(|e| e.priority);
        enabled.into_iter().map(|e| e.kind).collect()
    }
}
