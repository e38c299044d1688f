//! First-load activation for one feed
//!
//! The initial page is requested once, when the contact surface has been
//! scrolled into view *and* this feed is the active tab. Whichever of the two
//! happens last fires the request.

/// Messages that can be sent to update the activation state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// The contact surface entered the viewport
    SurfaceRevealed,
    /// This feed became the active tab
    TabActivated,
    /// Another feed became the active tab
    TabDeactivated,
    /// The initial fetch did not populate the feed; arm the trigger again
    InitialFetchAbandoned,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lifecycle {
    surface_visible: bool,
    tab_active: bool,
    initial_requested: bool,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_tab_active(&self) -> bool {
        self.tab_active
    }

    pub fn is_initial_requested(&self) -> bool {
        self.initial_requested
    }

    /// Applies a message; returns true when the initial fetch should start now
    pub fn update(&mut self, message: Message) -> bool {
        match message {
            Message::SurfaceRevealed => self.surface_visible = true,
            Message::TabActivated => self.tab_active = true,
            Message::TabDeactivated => self.tab_active = false,
            Message::InitialFetchAbandoned => {
                self.initial_requested = false;
                return false;
            }
        }

        if self.surface_visible && self.tab_active && !self.initial_requested {
            self.initial_requested = true;
            return true;
        }
        false
    }
}
