//! Tests for the editor session.

use super::*;
use crate::bridge::{LocalChannel, PAGE_SOURCE};
use crate::model::{NotificationLevel, PlanTier, Point, ThemeId, ViewAction, templates};
use crate::persist::{MemoryStore, codec};
use crate::render::RenderResult;
use serde_json::{Value, json};
use url::form_urlencoded;

type Session = EditorSession<MemoryStore, LocalChannel>;

const STAGE: Rect = Rect::sized(400.0, 300.0);

fn ms(v: u64) -> Millis {
    Millis::new(v)
}

/// A mounted session plus the extension's end of the channel.
struct Harness {
    session: Session,
    extension: LocalChannel,
    inbox: Subscription,
}

impl Harness {
    fn mount(query: &str, store: MemoryStore) -> (Self, Vec<Effect>) {
        Self::mount_with(&ResolvedConfig::default(), query, store)
    }

    fn mount_with(config: &ResolvedConfig, query: &str, store: MemoryStore) -> (Self, Vec<Effect>) {
        let channel = LocalChannel::new();
        let inbox = channel.subscribe();
        let (session, effects) = EditorSession::mount(config, store, channel.clone(), query, ms(0));
        (
            Self {
                session,
                extension: channel,
                inbox,
            },
            effects,
        )
    }

    fn send(&self, kind: &str, data: Value) {
        self.extension.post(json!({
            "source": "flow2chat_extension",
            "type": kind,
            "data": data,
        }));
    }

    /// Types of the messages the page posted since the last call.
    fn page_posts(&self) -> Vec<Value> {
        self.inbox
            .drain()
            .into_iter()
            .filter(|m| m["source"] == PAGE_SOURCE)
            .collect()
    }

    /// Run the first debounced render and display `svg` for it.
    fn show(&mut self, svg: &str, at: u64) -> RenderRequest {
        let request = renders(&self.session.poll(ms(at)))
            .pop()
            .expect("debounced render due");
        self.session
            .handle(Event::RenderCompleted(RenderResult::svg(&request, svg)), ms(at));
        request
    }
}

fn renders(effects: &[Effect]) -> Vec<RenderRequest> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::Render(r) => Some(r.clone()),
            _ => None,
        })
        .collect()
}

fn notes(effects: &[Effect]) -> Vec<(NotificationLevel, String)> {
    effects
        .iter()
        .filter_map(Effect::notification)
        .map(|n| (n.level, n.message.clone()))
        .collect()
}

fn transforms(effects: &[Effect]) -> Vec<String> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::ApplyTransform { css, .. } => Some(css.clone()),
            _ => None,
        })
        .collect()
}

// ===== Mount =====

#[test]
fn mount_without_params_renders_first_template_after_debounce() {
    let (mut h, effects) = Harness::mount("", MemoryStore::new());

    assert_eq!(
        effects,
        vec![Effect::ApplyTransform {
            css: "translate(0px, 0px) scale(1)".to_string(),
            zoom_percent: 100,
        }]
    );
    assert_eq!(h.session.next_deadline(), Some(ms(120)));
    assert!(renders(&h.session.poll(ms(119))).is_empty());

    let issued = renders(&h.session.poll(ms(120)));
    assert_eq!(issued.len(), 1);
    assert_eq!(issued[0].markup, templates::TEMPLATES[0].code);
    assert_eq!(issued[0].theme, ThemeId::Default);
}

#[test]
fn mount_announces_page_ready() {
    let (h, _) = Harness::mount("", MemoryStore::new());
    let posts = h.page_posts();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["type"], "f2c_page_ready");
}

#[test]
fn persisted_snapshot_is_restored_exactly() {
    let saved = EditorDocument {
        markup_text: "flowchart TD\nA-->B".to_string(),
        selected_template_index: 0,
        theme_id: ThemeId::Forest,
        timestamp: 11,
    };
    let store = MemoryStore::with_entry(STORAGE_KEY, codec::serialize(&saved));

    let (mut h, _) = Harness::mount("", store);

    assert_eq!(h.session.document(), &saved);
    assert_eq!(h.session.theme_source(), ThemeSource::Persisted);
    let issued = renders(&h.session.poll(ms(120)));
    assert_eq!(issued[0].markup, "flowchart TD\nA-->B");
    assert_eq!(issued[0].theme, ThemeId::Forest);
}

// ===== Rendering =====

#[test]
fn burst_of_edits_issues_one_render_with_last_markup() {
    let (mut h, _) = Harness::mount("", MemoryStore::new());

    for (i, at) in [10u64, 50, 100].into_iter().enumerate() {
        h.session
            .handle(Event::MarkupEdited(format!("graph TD\nA-->B{i}")), ms(at));
    }

    assert!(renders(&h.session.poll(ms(219))).is_empty());
    let issued = renders(&h.session.poll(ms(220)));
    assert_eq!(issued.len(), 1);
    assert_eq!(issued[0].markup, "graph TD\nA-->B2");
}

#[test]
fn stale_render_result_is_never_displayed() {
    let (mut h, _) = Harness::mount("", MemoryStore::new());
    let first = renders(&h.session.poll(ms(120))).remove(0);
    h.session.handle(Event::MarkupEdited("graph LR\nX".to_string()), ms(130));
    let second = renders(&h.session.handle(Event::RenderNow, ms(140))).remove(0);

    let applied = h
        .session
        .handle(Event::RenderCompleted(RenderResult::svg(&second, "<svg>B</svg>")), ms(150));
    let late = h
        .session
        .handle(Event::RenderCompleted(RenderResult::svg(&first, "<svg>A</svg>")), ms(160));

    assert_eq!(
        applied,
        vec![
            Effect::ShowSvg {
                id: second.id,
                svg: "<svg>B</svg>".to_string()
            },
            Effect::MeasureContent {
                request_id: second.id
            },
        ]
    );
    assert!(late.is_empty());
    assert_eq!(h.session.displayed().svg(), Some("<svg>B</svg>"));
}

#[test]
fn render_error_is_shown_and_viewport_untouched() {
    let (mut h, _) = Harness::mount("", MemoryStore::new());
    h.session.handle(Event::StageResized(STAGE), ms(0));
    let request = renders(&h.session.poll(ms(120))).remove(0);

    let effects = h.session.handle(
        Event::RenderCompleted(RenderResult::error(&request, "Parse error on line 2")),
        ms(130),
    );

    assert_eq!(
        effects,
        vec![Effect::ShowError {
            id: request.id,
            message: "Parse error on line 2".to_string()
        }]
    );
    assert!(h.session.handle(Event::View(ViewAction::FitToView), ms(140)).is_empty());
    assert_eq!(h.session.viewport(), ViewportState::IDENTITY);
}

#[test]
fn measured_content_is_centered_once() {
    let (mut h, _) = Harness::mount("", MemoryStore::new());
    h.session.handle(Event::StageResized(STAGE), ms(0));
    let request = h.show("<svg/>", 120);

    let content = Rect::new(0.0, 0.0, 100.0, 50.0);
    let effects = h.session.handle(
        Event::ContentMeasured {
            request_id: request.id,
            content,
        },
        ms(130),
    );
    assert_eq!(transforms(&effects), vec!["translate(150px, 125px) scale(1)"]);

    h.session.handle(Event::Wheel { delta_y: -1.0, pointer: Point::new(0.0, 0.0) }, ms(140));
    let again = h.session.handle(
        Event::ContentMeasured {
            request_id: request.id,
            content,
        },
        ms(150),
    );
    assert!(transforms(&again).is_empty());
}

#[test]
fn auto_fit_waits_for_stage_layout() {
    let (mut h, _) = Harness::mount("", MemoryStore::new());
    let request = h.show("<svg/>", 120);

    let measured = h.session.handle(
        Event::ContentMeasured {
            request_id: request.id,
            content: Rect::sized(100.0, 100.0),
        },
        ms(130),
    );
    assert!(transforms(&measured).is_empty());

    let laid_out = h.session.handle(Event::StageResized(STAGE), ms(140));
    assert_eq!(transforms(&laid_out), vec!["translate(150px, 100px) scale(1)"]);
}

#[test]
fn fit_policy_scales_large_content_down() {
    let config = ResolvedConfig {
        auto_fit: AutoFit::Fit,
        ..ResolvedConfig::default()
    };
    let (mut h, _) = Harness::mount_with(&config, "", MemoryStore::new());
    h.session.handle(Event::StageResized(STAGE), ms(0));
    let request = h.show("<svg/>", 120);

    h.session.handle(
        Event::ContentMeasured {
            request_id: request.id,
            content: Rect::sized(800.0, 600.0),
        },
        ms(130),
    );

    let state = h.session.viewport();
    assert!((state.scale - 0.42).abs() < 1e-9);
    assert!(state.scale < 1.0);
}

// ===== Gestures =====

#[test]
fn wheel_zooms_about_pointer() {
    let (mut h, _) = Harness::mount("", MemoryStore::new());

    let effects = h.session.handle(
        Event::Wheel {
            delta_y: -100.0,
            pointer: Point::new(100.0, 100.0),
        },
        ms(0),
    );

    let state = h.session.viewport();
    assert!((state.scale - 1.1).abs() < 1e-12);
    assert!((state.translate_x + 10.0).abs() < 1e-9);
    assert!((state.translate_y + 10.0).abs() < 1e-9);
    assert!(matches!(
        effects.as_slice(),
        [Effect::ApplyTransform {
            zoom_percent: 110,
            ..
        }]
    ));
}

#[test]
fn drag_pans_until_released() {
    let (mut h, _) = Harness::mount("", MemoryStore::new());

    h.session.handle(Event::DragStart(Point::new(0.0, 0.0)), ms(0));
    let moved = h.session.handle(Event::DragMove(Point::new(10.0, 5.0)), ms(1));
    h.session.handle(Event::DragEnd, ms(2));
    let after = h.session.handle(Event::DragMove(Point::new(50.0, 50.0)), ms(3));

    assert_eq!(transforms(&moved), vec!["translate(10px, 5px) scale(1)"]);
    assert!(after.is_empty());
    assert_eq!(h.session.viewport(), ViewportState::new(1.0, 10.0, 5.0));
}

#[test]
fn bound_key_runs_view_action() {
    let (mut h, _) = Harness::mount("", MemoryStore::new());
    h.session.handle(Event::StageResized(STAGE), ms(0));

    let effects = h.session.handle(Event::KeyPressed("+".to_string()), ms(1));
    assert!(matches!(
        effects.as_slice(),
        [Effect::ApplyTransform {
            zoom_percent: 120,
            ..
        }]
    ));
    assert!(h
        .session
        .handle(Event::KeyPressed("q".to_string()), ms(2))
        .is_empty());
}

// ===== Document edits =====

#[test]
fn template_pick_renders_immediately() {
    let (mut h, _) = Harness::mount("", MemoryStore::new());

    let effects = h.session.handle(Event::TemplateSelected(2), ms(10));

    let issued = renders(&effects);
    assert_eq!(issued.len(), 1);
    assert_eq!(issued[0].markup, templates::TEMPLATES[2].code);
    assert_eq!(h.session.document().selected_template_index, 2);
    assert!(h
        .session
        .handle(Event::TemplateSelected(99), ms(20))
        .is_empty());
}

#[test]
fn user_theme_pick_renders_and_notifies() {
    let (mut h, _) = Harness::mount("", MemoryStore::new());

    let effects = h.session.handle(Event::ThemeSelected(ThemeId::Dark), ms(10));

    assert_eq!(renders(&effects)[0].theme, ThemeId::Dark);
    assert_eq!(
        notes(&effects),
        vec![(NotificationLevel::Success, "Dark theme applied".to_string())]
    );
    assert_eq!(h.session.theme_source(), ThemeSource::User);
}

#[test]
fn import_notifies_and_schedules_render() {
    let (mut h, _) = Harness::mount("", MemoryStore::new());

    let effects = h
        .session
        .handle(Event::MarkupImported("pie\n\"A\" : 1".to_string()), ms(10));

    assert_eq!(
        notes(&effects),
        vec![(NotificationLevel::Success, "File imported successfully".to_string())]
    );
    assert_eq!(h.session.next_deadline(), Some(ms(130)));
}

// ===== Persistence =====

#[test]
fn snapshot_written_after_quiet_window() {
    let (mut h, _) = Harness::mount("", MemoryStore::new());
    h.session.handle(Event::MarkupEdited("graph TD\nS".to_string()), ms(100));

    h.session.poll(ms(349));
    assert_eq!(h.session.store().get(STORAGE_KEY).unwrap(), None);

    h.session.poll(ms(350));
    let saved = h.session.store().get(STORAGE_KEY).unwrap().expect("written");
    assert_eq!(codec::deserialize(&saved).unwrap().markup_text, "graph TD\nS");
}

#[test]
fn empty_share_param_leaves_saved_work_intact() {
    let saved = EditorDocument {
        markup_text: "flowchart TD\nA-->B".to_string(),
        selected_template_index: 0,
        theme_id: ThemeId::Default,
        timestamp: 5,
    };
    let store = MemoryStore::with_entry(STORAGE_KEY, codec::serialize(&saved));

    let (mut h, _) = Harness::mount("?d=", store);
    assert_eq!(h.session.document().markup_text, "flowchart TD\nA-->B");
    h.session.poll(ms(300));
    let (store, _) = h.session.teardown();

    let stored = store.get(STORAGE_KEY).unwrap().expect("snapshot kept");
    assert_eq!(codec::deserialize(&stored).unwrap().markup_text, "flowchart TD\nA-->B");
}

#[test]
fn teardown_flushes_snapshot_and_unsubscribes() {
    let (mut h, _) = Harness::mount("", MemoryStore::new());
    h.session.handle(Event::MarkupEdited("graph TD\nT".to_string()), ms(10));
    assert_eq!(h.extension.subscriber_count(), 2);

    let (store, channel) = h.session.teardown();

    let saved = store.get(STORAGE_KEY).unwrap().expect("flushed");
    assert_eq!(codec::deserialize(&saved).unwrap().markup_text, "graph TD\nT");
    assert_eq!(channel.subscriber_count(), 1);
}

// ===== Extension bridge =====

fn share_query(markup: &str, theme: &str) -> String {
    form_urlencoded::Serializer::new(String::new())
        .append_pair("d", &codec::encode_text(markup))
        .append_pair("theme", theme)
        .finish()
}

#[test]
fn share_link_with_dark_theme_loads_markup_and_theme() {
    let (h, _) = Harness::mount(&share_query("graph TD\nA-->B", "dark"), MemoryStore::new());

    assert_eq!(h.session.document().markup_text, "graph TD\nA-->B");
    assert_eq!(h.session.document().theme_id, ThemeId::Dark);
    assert_eq!(h.session.theme_source(), ThemeSource::ShareLink);
}

#[test]
fn timeout_then_late_free_plan_downgrades_share_theme() {
    let (mut h, _) = Harness::mount(&share_query("graph TD\nA", "dark"), MemoryStore::new());
    h.page_posts();

    let timed_out = h.session.poll(ms(2000));
    assert_eq!(
        notes(&timed_out),
        vec![(
            NotificationLevel::Success,
            "Applied dark theme from share link".to_string()
        )]
    );
    assert_eq!(h.session.document().theme_id, ThemeId::Dark);

    h.send("f2c_extension_connected", json!({ "version": "2.0.1" }));
    h.session.poll(ms(2500));
    let posts = h.page_posts();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["type"], "f2c_request_settings");

    h.send("f2c_settings_update", json!({ "plan": "free" }));
    let downgraded = h.session.poll(ms(2600));

    assert_eq!(
        notes(&downgraded),
        vec![
            (
                NotificationLevel::Info,
                "Pro theme not available on free plan - using default".to_string()
            ),
            (
                NotificationLevel::Info,
                "Settings synced from extension".to_string()
            ),
        ]
    );
    assert_eq!(h.session.document().theme_id, ThemeId::Default);
    assert_eq!(h.session.next_deadline(), Some(ms(2720)));
}

#[test]
fn extension_theme_applies_until_user_picks_one() {
    let (mut h, _) = Harness::mount("", MemoryStore::new());
    h.send("f2c_extension_connected", json!({}));
    h.send("f2c_settings_update", json!({ "plan": "pro", "theme": "forest" }));
    h.session.poll(ms(10));

    assert_eq!(h.session.document().theme_id, ThemeId::Forest);
    assert_eq!(h.session.theme_source(), ThemeSource::Extension);
    assert_eq!(h.session.bridge().session().plan, PlanTier::Pro);

    h.session.handle(Event::ThemeSelected(ThemeId::Neutral), ms(20));
    h.send("f2c_settings_update", json!({ "plan": "pro", "theme": "base" }));
    h.session.poll(ms(30));

    assert_eq!(h.session.document().theme_id, ThemeId::Neutral);
}

#[test]
fn save_settings_round_trip() {
    let (mut h, _) = Harness::mount("", MemoryStore::new());
    h.page_posts();

    h.session.handle(Event::SaveToExtension, ms(5));
    assert!(h.page_posts().is_empty(), "no push before connection");

    h.send("f2c_extension_connected", json!({ "version": "1.0.0" }));
    h.session.poll(ms(10));
    h.page_posts();

    h.session.handle(Event::SaveToExtension, ms(20));
    let posts = h.page_posts();
    assert_eq!(posts[0]["type"], "f2c_save_settings");
    assert_eq!(posts[0]["data"]["requestId"], 1);
    assert_eq!(posts[0]["data"]["theme"], "default");

    h.send("f2c_settings_saved", json!({ "success": true, "requestId": 1 }));
    let effects = h.session.poll(ms(30));
    assert_eq!(
        notes(&effects),
        vec![(NotificationLevel::Success, "Settings saved to extension".to_string())]
    );
}

#[test]
fn foreign_messages_are_ignored() {
    let (mut h, _) = Harness::mount("", MemoryStore::new());
    h.extension.post(json!({ "source": "other", "type": "f2c_settings_update" }));
    h.extension.post(json!("noise"));

    let effects = h.session.poll(ms(10));
    assert!(notes(&effects).is_empty());
}

// ===== Share and export =====

#[test]
fn copy_share_link_builds_url_and_reports_clipboard_outcome() {
    let (mut h, _) = Harness::mount("", MemoryStore::new());
    h.session.handle(Event::MarkupEdited("graph TD".to_string()), ms(0));

    let effects = h.session.handle(
        Event::CopyShareLink {
            page_url: "https://flow2chat.com/editor".to_string(),
        },
        ms(1),
    );
    assert_eq!(
        effects,
        vec![Effect::CopyToClipboard(
            "https://flow2chat.com/editor?d=Z3JhcGggVEQ%3D&theme=default".to_string()
        )]
    );

    let done = h.session.handle(Event::ClipboardWritten { success: true }, ms(2));
    assert_eq!(
        notes(&done),
        vec![(NotificationLevel::Success, "Share link copied to clipboard".to_string())]
    );

    let bad = h.session.handle(
        Event::CopyShareLink {
            page_url: "not a url".to_string(),
        },
        ms(3),
    );
    assert_eq!(
        notes(&bad),
        vec![(NotificationLevel::Error, "Unable to copy share link".to_string())]
    );
}

#[test]
fn export_requires_displayed_diagram() {
    let (mut h, _) = Harness::mount("", MemoryStore::new());
    let size = Size::new(200.0, 100.0);

    let nothing = h.session.handle(
        Event::Export {
            kind: ExportKind::Download,
            svg_size: size,
        },
        ms(0),
    );
    assert_eq!(
        notes(&nothing),
        vec![(NotificationLevel::Error, "No diagram to download".to_string())]
    );

    h.show("<svg/>", 120);
    let planned = h.session.handle(
        Event::Export {
            kind: ExportKind::Download,
            svg_size: size,
        },
        ms(130),
    );
    match planned.as_slice() {
        [Effect::Export(plan)] => {
            assert_eq!((plan.canvas_width, plan.canvas_height), (480, 280));
            assert!(plan.svg_data_url.starts_with("data:image/svg+xml;base64,"));
        }
        other => panic!("expected export plan, got {other:?}"),
    }
}
