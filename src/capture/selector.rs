//! Interactive region selection.
//!
//! The selector is driven by pointer and keyboard events from a full-screen
//! overlay and ends in exactly one of two terminal states: a validated
//! rectangle or a cancellation.

use log::debug;

use crate::models::{Point, Rect};

/// Input delivered by the overlay surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorEvent {
    /// Primary button pressed
    PointerDown(Point),
    /// Pointer moved (with or without the button held)
    PointerMove(Point),
    /// Primary button released
    PointerUp(Point),
    /// Escape key or the overlay was closed
    Cancel,
}

/// Where the selection currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionState {
    /// Waiting for a drag to start
    #[default]
    Idle,
    /// Button held; `rect` spans `anchor` and the latest pointer position
    Dragging {
        /// Where the drag started
        anchor: Point,
        /// Normalized selection so far
        rect: Rect,
    },
    /// A large enough rectangle was released
    Completed(Rect),
    /// The user cancelled
    Cancelled,
}

/// Terminal result handed back to whoever opened the overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// Region to capture
    Completed(Rect),
    /// Nothing to capture
    Cancelled,
}

/// Drag-to-select state machine
#[derive(Debug, Default)]
pub struct RegionSelector {
    state: SelectionState,
    rejected: usize,
}

impl RegionSelector {
    /// Start a new selection session
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    pub fn state(&self) -> SelectionState {
        self.state
    }

    /// Number of released drags that were too small
    pub fn rejected_gestures(&self) -> usize {
        self.rejected
    }

    /// True once Completed or Cancelled
    pub fn is_finished(&self) -> bool {
        matches!(
            self.state,
            SelectionState::Completed(_) | SelectionState::Cancelled
        )
    }

    /// Terminal outcome, if reached
    pub fn outcome(&self) -> Option<SelectionOutcome> {
        match self.state {
            SelectionState::Completed(rect) => Some(SelectionOutcome::Completed(rect)),
            SelectionState::Cancelled => Some(SelectionOutcome::Cancelled),
            _ => None,
        }
    }

    /// Rectangle to outline, if any
    pub fn current_rect(&self) -> Option<Rect> {
        match self.state {
            SelectionState::Dragging { rect, .. } | SelectionState::Completed(rect) => Some(rect),
            _ => None,
        }
    }

    /// Live "W x H" feedback while a non-empty rectangle is shown
    pub fn feedback_label(&self) -> Option<String> {
        self.current_rect()
            .filter(|r| !r.is_empty())
            .map(|r| r.size_label())
    }

    /// Feed one event. Returns true when the overlay should be redrawn.
    pub fn handle(&mut self, event: SelectorEvent) -> bool {
        if self.is_finished() {
            return false;
        }

        match (self.state, event) {
            (_, SelectorEvent::Cancel) => {
                self.state = SelectionState::Cancelled;
                debug!("Selection cancelled");
                true
            }
            (_, SelectorEvent::PointerDown(p)) => {
                self.state = SelectionState::Dragging {
                    anchor: p,
                    rect: Rect::at_point(p),
                };
                true
            }
            (SelectionState::Dragging { anchor, .. }, SelectorEvent::PointerMove(p)) => {
                self.state = SelectionState::Dragging {
                    anchor,
                    rect: Rect::spanning(anchor, p),
                };
                true
            }
            (SelectionState::Dragging { anchor, .. }, SelectorEvent::PointerUp(p)) => {
                let rect = Rect::spanning(anchor, p);
                if rect.is_degenerate() {
                    // Too small: drop the gesture and keep the session open
                    self.rejected += 1;
                    debug!("Rejected {} selection", rect.size_label());
                    self.state = SelectionState::Idle;
                } else {
                    debug!("Selection completed: {:?}", rect);
                    self.state = SelectionState::Completed(rect);
                }
                true
            }
            (_, SelectorEvent::PointerMove(_)) | (_, SelectorEvent::PointerUp(_)) => false,
        }
    }
}

/// Drive a selector to completion. Running out of events before a terminal
/// state counts as the overlay being closed, i.e. a cancellation.
pub fn run_selection<I>(events: I) -> SelectionOutcome
where
    I: IntoIterator<Item = SelectorEvent>,
{
    let mut selector = RegionSelector::new();
    for event in events {
        selector.handle(event);
        if let Some(outcome) = selector.outcome() {
            return outcome;
        }
    }
    SelectionOutcome::Cancelled
}
