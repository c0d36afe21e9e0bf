//! Operator's choice of channels to plot

use std::collections::BTreeSet;

/// Set of channel indices shown in the time series.
///
/// Defaults to channel 0. An empty selection is allowed (the operator can
/// untick everything) but plots channel 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSelection {
    selected: BTreeSet<usize>,
}

impl Default for ChannelSelection {
    fn default() -> Self {
        Self {
            selected: BTreeSet::from([0]),
        }
    }
}

impl ChannelSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_selected(&self, channel: usize) -> bool {
        self.selected.contains(&channel)
    }

    /// Select or deselect a channel
    pub fn set(&mut self, channel: usize, selected: bool) {
        if selected {
            self.selected.insert(channel);
        } else {
            self.selected.remove(&channel);
        }
    }

    pub fn toggle(&mut self, channel: usize) {
        let selected = self.is_selected(channel);
        self.set(channel, !selected);
    }

    /// Exactly what the operator ticked, ascending
    pub fn selected(&self) -> impl Iterator<Item = usize> + '_ {
        self.selected.iter().copied()
    }

    /// Channels to draw for a session with `channel_count` channels.
    ///
    /// Indices at or above the channel count are ignored; if nothing
    /// remains the result is `[0]`.
    pub fn plotted(&self, channel_count: usize) -> Vec<usize> {
        let plotted: Vec<usize> = self
            .selected
            .iter()
            .copied()
            .filter(|&ch| ch < channel_count)
            .collect();
        if plotted.is_empty() {
            vec![0]
        } else {
            plotted
        }
    }
}
