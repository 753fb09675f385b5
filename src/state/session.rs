//! Editor session: the single owner of all mutable editor state.
//!
//! Hosts drive the session with three calls:
//!
//! - [`EditorSession::handle`] for user input and collaborator answers
//! - [`EditorSession::poll`] when [`EditorSession::next_deadline`] passes or
//!   a channel message arrived
//! - [`EditorSession::teardown`] when the page goes away
//!
//! Each returns the [`Effect`]s to perform, in order. The session never
//! blocks, sleeps, or calls the renderer itself.

use super::event::{Effect, Event};
use super::view_handler::handle_view_action;
use crate::bridge::{BridgeReaction, ExtensionBridge, ExtensionMessage, MessageChannel, Subscription};
use crate::config::{AutoFit, KeyBindings, ResolvedConfig};
use crate::export::{ExportKind, ExportPlan, plan_export};
use crate::model::document::wall_clock_ms;
use crate::model::{
    EditorDocument, ExportError, Notification, Rect, ShareError, Size, ThemeSource,
};
use crate::persist::{
    InitialState, KeyValueStore, QueryParams, STORAGE_KEY, SnapshotWriter, resolve_initial,
    share_url,
};
use crate::render::{Completion, DisplayedRender, RenderCoordinator, RenderRequest};
use crate::timing::{Millis, earliest};
use crate::viewport::{DragTracker, ViewportEngine, ViewportState, wheel_zoom_factor};
use tracing::{debug, info, warn};

/// Live editor state plus its storage and extension channel.
#[derive(Debug)]
pub struct EditorSession<S: KeyValueStore, C: MessageChannel> {
    document: EditorDocument,
    theme_source: ThemeSource,
    viewport: ViewportEngine,
    stage: Rect,
    content: Option<Rect>,
    drag: DragTracker,
    coordinator: RenderCoordinator,
    bridge: ExtensionBridge,
    snapshots: SnapshotWriter,
    auto_fit: AutoFit,
    zoom_step: f64,
    keybindings: KeyBindings,
    store: S,
    channel: C,
    subscription: Subscription,
}

impl<S: KeyValueStore, C: MessageChannel> EditorSession<S, C> {
    /// Resolve the initial document, subscribe to the channel, announce the
    /// page and queue the first render.
    ///
    /// `page_query` is the page URL's query string (`?d=...&theme=...`).
    pub fn mount(
        config: &ResolvedConfig,
        store: S,
        channel: C,
        page_query: &str,
        now: Millis,
    ) -> (Self, Vec<Effect>) {
        let persisted = match store.get(STORAGE_KEY) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Could not read persisted snapshot");
                None
            }
        };

        let InitialState {
            document,
            markup_source,
            theme_source,
            share_claim,
        } = resolve_initial(
            &QueryParams::parse(page_query),
            persisted.as_deref(),
            wall_clock_ms(),
        );

        let subscription = channel.subscribe();
        let mut bridge = ExtensionBridge::new(config.bridge_timeout_ms, share_claim);
        for message in bridge.announce(now) {
            channel.post(message.to_value());
        }

        let mut coordinator = RenderCoordinator::new(config.render_debounce_ms);
        coordinator.input(document.markup_text.clone(), document.theme_id, now);

        let mut snapshots = SnapshotWriter::new(config.snapshot_debounce_ms);
        snapshots.stage(&document, now);

        info!(
            ?markup_source,
            ?theme_source,
            theme = %document.theme_id,
            auto_fit = %config.auto_fit,
            "Editor session mounted"
        );

        let session = Self {
            document,
            theme_source,
            viewport: ViewportEngine::new(config.scale_bounds, config.fit_padding_px),
            stage: Rect::default(),
            content: None,
            drag: DragTracker::default(),
            coordinator,
            bridge,
            snapshots,
            auto_fit: config.auto_fit,
            zoom_step: config.zoom_step,
            keybindings: config.keybindings.clone(),
            store,
            channel,
            subscription,
        };
        let effects = vec![session.transform_effect()];
        (session, effects)
    }

    /// Process one host event.
    pub fn handle(&mut self, event: Event, now: Millis) -> Vec<Effect> {
        let mut effects = Vec::new();
        match event {
            Event::MarkupEdited(markup) => {
                self.edit_markup(markup, now);
            }
            Event::MarkupImported(markup) => {
                self.edit_markup(markup, now);
                effects.push(Effect::Notify(Notification::success(
                    "File imported successfully",
                )));
            }
            Event::TemplateSelected(index) => {
                if self.document.select_template(index, wall_clock_ms()) {
                    self.snapshots.stage(&self.document, now);
                    effects.push(Effect::Render(self.render_now()));
                } else {
                    debug!(index, "Ignoring unknown template");
                }
            }
            Event::ThemeSelected(theme) => {
                self.bridge.user_picked_theme();
                self.theme_source = ThemeSource::User;
                if self.document.set_theme(theme, wall_clock_ms()) {
                    self.snapshots.stage(&self.document, now);
                    effects.push(Effect::Render(self.render_now()));
                    effects.push(Effect::Notify(Notification::success(format!(
                        "{} theme applied",
                        theme.display_name()
                    ))));
                }
            }
            Event::RenderNow => {
                effects.push(Effect::Render(self.render_now()));
            }
            Event::RenderCompleted(result) => match self.coordinator.complete(result) {
                Some(Completion::Svg { id, content }) => {
                    self.content = None;
                    effects.push(Effect::ShowSvg { id, svg: content });
                    effects.push(Effect::MeasureContent { request_id: id });
                }
                Some(Completion::Error { id, message }) => {
                    self.content = None;
                    effects.push(Effect::ShowError { id, message });
                }
                None => {}
            },
            Event::ContentMeasured {
                request_id,
                content,
            } => {
                if self.coordinator.displayed_svg_id() == Some(request_id) {
                    self.content = Some(content);
                    self.try_auto_fit(&mut effects);
                }
            }
            Event::StageResized(stage) => {
                self.stage = stage;
                self.try_auto_fit(&mut effects);
            }
            Event::Wheel { delta_y, pointer } => {
                self.viewport
                    .zoom_at_point(wheel_zoom_factor(delta_y), pointer);
                effects.push(self.transform_effect());
            }
            Event::DragStart(at) => self.drag.start(at),
            Event::DragMove(at) => {
                if let Some((dx, dy)) = self.drag.move_to(at) {
                    self.viewport.pan_by(dx, dy);
                    effects.push(self.transform_effect());
                }
            }
            Event::DragEnd => {
                self.drag.end();
            }
            Event::View(action) => {
                if handle_view_action(
                    &mut self.viewport,
                    action,
                    self.stage,
                    self.content,
                    self.zoom_step,
                ) {
                    effects.push(self.transform_effect());
                }
            }
            Event::KeyPressed(key) => match self.keybindings.get(&key) {
                Some(action) => return self.handle(Event::View(action), now),
                None => debug!(key = key.as_str(), "Unbound key"),
            },
            Event::SaveToExtension => {
                if let Some(message) = self.bridge.save_settings(self.document.theme_id) {
                    self.channel.post(message.to_value());
                }
            }
            Event::CopyShareLink { page_url } => match self.share_url(&page_url) {
                Ok(url) => effects.push(Effect::CopyToClipboard(url)),
                Err(e) => {
                    warn!(error = %e, "Share link could not be built");
                    effects.push(Effect::Notify(Notification::error(
                        "Unable to copy share link",
                    )));
                }
            },
            Event::ClipboardWritten { success } => {
                effects.push(Effect::Notify(if success {
                    Notification::success("Share link copied to clipboard")
                } else {
                    Notification::error("Unable to copy share link")
                }));
            }
            Event::Export { kind, svg_size } => {
                match self.export_plan(kind, svg_size, wall_clock_ms()) {
                    Ok(plan) => effects.push(Effect::Export(plan)),
                    Err(e) => effects.push(Effect::Notify(Notification::error(e.to_string()))),
                }
            }
        }
        effects
    }

    /// Drain extension messages and fire due timers.
    pub fn poll(&mut self, now: Millis) -> Vec<Effect> {
        let mut effects = Vec::new();

        for raw in self.subscription.drain() {
            if let Some(message) = ExtensionMessage::parse(&raw) {
                let reaction = self.bridge.handle(message, self.theme_source);
                self.apply_reaction(reaction, now, &mut effects);
            }
        }

        let reaction = self.bridge.poll(now);
        self.apply_reaction(reaction, now, &mut effects);

        if let Some(request) = self.coordinator.poll(now) {
            effects.push(Effect::Render(request));
        }

        self.snapshots.poll(&mut self.store, now);
        effects
    }

    /// Earliest time [`poll`](Self::poll) has timer work to do.
    pub fn next_deadline(&self) -> Option<Millis> {
        earliest([
            self.coordinator.deadline(),
            self.snapshots.deadline(),
            self.bridge.deadline(),
        ])
    }

    /// Flush the pending snapshot and release the channel subscription.
    ///
    /// Returns the store and channel for reuse.
    pub fn teardown(mut self) -> (S, C) {
        self.snapshots.flush(&mut self.store);
        let Self {
            store,
            channel,
            subscription,
            ..
        } = self;
        drop(subscription);
        debug!("Editor session torn down");
        (store, channel)
    }

    /// Share link for the current document.
    pub fn share_url(&self, page_url: &str) -> Result<String, ShareError> {
        share_url(page_url, &self.document)
    }

    /// Export plan for the displayed SVG.
    pub fn export_plan(
        &self,
        kind: ExportKind,
        svg_size: Size,
        now_ms: i64,
    ) -> Result<ExportPlan, ExportError> {
        plan_export(kind, self.coordinator.displayed().svg(), svg_size, now_ms)
    }

    /// The current document.
    pub fn document(&self) -> &EditorDocument {
        &self.document
    }

    /// Where the current theme came from.
    pub fn theme_source(&self) -> ThemeSource {
        self.theme_source
    }

    /// Current transform of the preview.
    pub fn viewport(&self) -> ViewportState {
        self.viewport.state()
    }

    /// The render result on screen.
    pub fn displayed(&self) -> &DisplayedRender {
        self.coordinator.displayed()
    }

    /// Extension handshake state.
    pub fn bridge(&self) -> &ExtensionBridge {
        &self.bridge
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn edit_markup(&mut self, markup: String, now: Millis) {
        if self.document.set_markup(markup, wall_clock_ms()) {
            self.snapshots.stage(&self.document, now);
            self.coordinator
                .input(self.document.markup_text.clone(), self.document.theme_id, now);
        }
    }

    fn render_now(&mut self) -> RenderRequest {
        self.coordinator
            .request_now(self.document.markup_text.clone(), self.document.theme_id)
    }

    fn try_auto_fit(&mut self, effects: &mut Vec<Effect>) {
        let (Some(id), Some(content)) = (self.coordinator.displayed_svg_id(), self.content) else {
            return;
        };
        if self.stage.is_degenerate() || !self.coordinator.take_auto_fit(id, content) {
            return;
        }
        match self.auto_fit {
            AutoFit::Center => self.viewport.reset_and_center(content, self.stage),
            AutoFit::Fit => self.viewport.fit_to_bounds(content, self.stage),
        };
        debug!(%id, policy = %self.auto_fit, "Auto-fit applied");
        effects.push(self.transform_effect());
    }

    fn apply_reaction(&mut self, reaction: BridgeReaction, now: Millis, effects: &mut Vec<Effect>) {
        for message in reaction.outgoing {
            self.channel.post(message.to_value());
        }
        if let Some((theme, source)) = reaction.theme {
            self.theme_source = source;
            if self.document.set_theme(theme, wall_clock_ms()) {
                self.snapshots.stage(&self.document, now);
                self.coordinator
                    .input(self.document.markup_text.clone(), theme, now);
            }
        }
        effects.extend(reaction.notifications.into_iter().map(Effect::Notify));
    }

    fn transform_effect(&self) -> Effect {
        let state = self.viewport.state();
        Effect::ApplyTransform {
            css: state.to_css_transform(),
            zoom_percent: state.zoom_percent(),
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
