//! Extension bridge.
//!
//! Settings-sync handshake with the Flow2Chat browser extension:
//!
//! ```text
//! Idle --announce--> AwaitingConnection --connected--> Connected
//!                           |                              ^
//!                           +--timeout--> TimedOut --------+ (late connect)
//! ```
//!
//! The bridge is pure: it consumes parsed [`ExtensionMessage`]s and timer
//! ticks and answers with a [`BridgeReaction`] (theme change, notifications,
//! messages to post). The session owns the channel and applies reactions.
//!
//! # Share claims
//!
//! A theme from the `theme` query parameter is applied at load but must be
//! authorized by the user's plan. The claim is *pending* until either the
//! extension reports a plan (confirmed, or revoked and downgraded to
//! `default` on the free plan) or the connection times out (provisional:
//! applied without a plan, still re-checked by any later settings update).

pub mod channel;
pub mod message;

pub use channel::{LocalChannel, Mailbox, MessageChannel, Subscription};
pub use message::{EXTENSION_SOURCE, ExtensionMessage, PAGE_SOURCE, PageMessage};

use crate::model::{BridgeError, Notification, PlanTier, ThemeId, ThemeSource};
use crate::timing::{Deadline, Millis};
use tracing::{debug, info};

/// Connection state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BridgeState {
    /// [`ExtensionBridge::announce`] has not run yet.
    #[default]
    Idle,
    /// `page_ready` posted, waiting for the extension to answer.
    AwaitingConnection,
    /// The extension answered.
    Connected {
        /// Version the extension reported.
        version: Option<String>,
    },
    /// No answer within the timeout. A late connection is still accepted.
    TimedOut,
}

/// What the page knows about the extension. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtensionSession {
    /// The extension answered the handshake.
    pub connected: bool,
    /// Extension version, if it reported one.
    pub version: Option<String>,
    /// Plan tier. Free until the extension says otherwise.
    pub plan: PlanTier,
    /// Theme stored in the extension.
    pub remote_theme: Option<ThemeId>,
}

/// Authorization status of a share-link theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimStatus {
    /// No plan information yet.
    Pending,
    /// Kept after the handshake timed out. A later Free plan still revokes it.
    Provisional,
    /// The plan allows the theme.
    Confirmed,
}

/// Theme requested by a share link, pending plan authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShareClaim {
    /// The requested theme.
    pub theme: ThemeId,
    /// How far authorization has got.
    pub status: ClaimStatus,
}

/// Output of one bridge step.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BridgeReaction {
    /// Theme to apply and where it came from.
    pub theme: Option<(ThemeId, ThemeSource)>,
    /// Toasts to show.
    pub notifications: Vec<Notification>,
    /// Messages to post to the extension.
    pub outgoing: Vec<PageMessage>,
}

impl BridgeReaction {
    /// Whether the step changed nothing.
    pub fn is_empty(&self) -> bool {
        self.theme.is_none() && self.notifications.is_empty() && self.outgoing.is_empty()
    }
}

/// Handshake state machine.
#[derive(Debug, Clone)]
pub struct ExtensionBridge {
    state: BridgeState,
    session: ExtensionSession,
    claim: Option<ShareClaim>,
    timeout_ms: u64,
    timer: Deadline,
    next_save_id: u64,
    latest_save: Option<u64>,
}

impl ExtensionBridge {
    /// New bridge; `share_claim` is the theme taken from the share link.
    pub fn new(timeout_ms: u64, share_claim: Option<ThemeId>) -> Self {
        Self {
            state: BridgeState::Idle,
            session: ExtensionSession::default(),
            claim: share_claim.map(|theme| ShareClaim {
                theme,
                status: ClaimStatus::Pending,
            }),
            timeout_ms,
            timer: Deadline::default(),
            next_save_id: 1,
            latest_save: None,
        }
    }

    /// Connection state.
    pub fn state(&self) -> &BridgeState {
        &self.state
    }

    /// What the extension has reported so far.
    pub fn session(&self) -> &ExtensionSession {
        &self.session
    }

    /// The share-link theme claim, until it is confirmed, revoked or dropped.
    pub fn claim(&self) -> Option<ShareClaim> {
        self.claim
    }

    /// Whether the handshake has completed.
    pub fn is_connected(&self) -> bool {
        self.session.connected
    }

    /// When the connection timeout fires, if armed.
    pub fn deadline(&self) -> Option<Millis> {
        self.timer.at()
    }

    /// Announce the page and start waiting for the extension.
    pub fn announce(&mut self, now: Millis) -> Vec<PageMessage> {
        if self.state != BridgeState::Idle {
            return Vec::new();
        }
        self.state = BridgeState::AwaitingConnection;
        self.timer.arm(now, self.timeout_ms);
        debug!(timeout_ms = self.timeout_ms, "Waiting for extension");
        vec![PageMessage::PageReady]
    }

    /// Fire the connection timeout if due.
    pub fn poll(&mut self, now: Millis) -> BridgeReaction {
        let mut reaction = BridgeReaction::default();
        if !self.timer.fire(now) || self.state != BridgeState::AwaitingConnection {
            return reaction;
        }

        self.state = BridgeState::TimedOut;
        info!(
            error = %BridgeError::Timeout { waited_ms: self.timeout_ms },
            "Continuing without extension"
        );

        if let Some(claim) = self.claim.as_mut() {
            if claim.status == ClaimStatus::Pending {
                claim.status = ClaimStatus::Provisional;
                reaction.theme = Some((claim.theme, ThemeSource::ShareLink));
                if !claim.theme.is_default() {
                    reaction.notifications.push(applied_from_share_link(claim.theme));
                }
            }
        }
        reaction
    }

    /// React to a message from the extension.
    ///
    /// `current` is the source of the theme currently shown; it decides
    /// whether an extension-provided theme may replace it.
    pub fn handle(&mut self, message: ExtensionMessage, current: ThemeSource) -> BridgeReaction {
        match message {
            ExtensionMessage::Connected { version } => self.on_connected(version),
            ExtensionMessage::SettingsUpdate { plan, theme } => {
                self.on_settings_update(plan, theme, current)
            }
            ExtensionMessage::SettingsSaved {
                success,
                error,
                request_id,
            } => self.on_settings_saved(success, error, request_id),
        }
    }

    /// Build a settings push. Only possible while connected.
    pub fn save_settings(&mut self, theme: ThemeId) -> Option<PageMessage> {
        if !self.session.connected {
            debug!("Save requested without a connected extension");
            return None;
        }
        let request_id = self.next_save_id;
        self.next_save_id += 1;
        self.latest_save = Some(request_id);
        Some(PageMessage::SaveSettings {
            plan: self.session.plan,
            theme,
            request_id,
        })
    }

    /// The user picked a theme; a share-link theme no longer applies.
    pub fn user_picked_theme(&mut self) {
        if let Some(claim) = self.claim.take() {
            debug!(theme = %claim.theme, "Share claim dropped by user theme pick");
        }
    }

    fn on_connected(&mut self, version: Option<String>) -> BridgeReaction {
        let late = self.state == BridgeState::TimedOut;
        self.timer.cancel();
        self.state = BridgeState::Connected {
            version: version.clone(),
        };
        self.session.connected = true;
        self.session.version = version;
        info!(
            version = self.session.version.as_deref().unwrap_or("unknown"),
            late,
            "Extension connected"
        );
        BridgeReaction {
            outgoing: vec![PageMessage::RequestSettings],
            ..BridgeReaction::default()
        }
    }

    fn on_settings_update(
        &mut self,
        plan: Option<PlanTier>,
        theme: Option<ThemeId>,
        current: ThemeSource,
    ) -> BridgeReaction {
        let mut reaction = BridgeReaction::default();
        let mut source = current;

        if let Some(plan) = plan {
            self.session.plan = plan;
            if let Some(claim) = self.claim.as_mut() {
                if claim.theme.is_authorized_for(plan) {
                    if claim.status != ClaimStatus::Confirmed && !claim.theme.is_default() {
                        reaction.notifications.push(applied_from_share_link(claim.theme));
                    }
                    claim.status = ClaimStatus::Confirmed;
                    reaction.theme = Some((claim.theme, ThemeSource::ShareLink));
                } else {
                    info!(theme = %claim.theme, %plan, "Share-link theme not available on plan");
                    self.claim = None;
                    source = ThemeSource::Default;
                    reaction.theme = Some((ThemeId::Default, ThemeSource::Default));
                    reaction.notifications.push(Notification::info(
                        "Pro theme not available on free plan - using default",
                    ));
                }
            }
        }

        self.session.remote_theme = theme;
        if let Some(theme) = theme {
            if self.claim.is_none() && source.yields_to_extension() {
                reaction.theme = Some((theme, ThemeSource::Extension));
            }
        }

        debug!(plan = %self.session.plan, ?theme, "Settings update applied");
        reaction
            .notifications
            .push(Notification::info("Settings synced from extension"));
        reaction
    }

    fn on_settings_saved(
        &mut self,
        success: bool,
        error: Option<String>,
        request_id: Option<u64>,
    ) -> BridgeReaction {
        match (request_id, self.latest_save) {
            (_, None) => {
                debug!(id = ?request_id, "Ignoring save reply with no save in flight");
                return BridgeReaction::default();
            }
            (Some(id), Some(latest)) if id != latest => {
                debug!(id, latest, "Ignoring reply to superseded save");
                return BridgeReaction::default();
            }
            _ => {}
        }
        self.latest_save = None;

        let notification = if success {
            Notification::success("Settings saved to extension")
        } else {
            Notification::error(BridgeError::SaveRejected { reason: error }.to_string())
        };
        BridgeReaction {
            notifications: vec![notification],
            ..BridgeReaction::default()
        }
    }
}

fn applied_from_share_link(theme: ThemeId) -> Notification {
    Notification::success(format!("Applied {theme} theme from share link"))
}

#[cfg(test)]
#[path = "bridge_tests.rs"]
mod tests;
