//! A mounted carousel on a headless page, driven by protocol signals.

use anyhow::{Context, Result};
use carousel_core::{Carousel, Dom, DomEvent, EventKind, FocusState, Key, NodeId};
use carousel_dom::Document;
use carousel_protocol::{FocusReport, KeyName, Response, Signal, Target};
use tracing::{debug, info, warn};

use crate::config::Config;

/// Host-side state: the document and the carousel mounted on it.
///
/// When mounting fails the session keeps running with a static page and
/// answers every carousel signal with [`Response::Static`].
pub struct Session {
    document: Document,
    carousel: Option<Carousel>,
    auto_complete: bool,
}

impl Session {
    /// Render the configured page and mount the carousel on it.
    pub fn new(config: &Config) -> Result<Self> {
        let mut document = config
            .page
            .build()
            .context("Failed to render the carousel page")?;

        let carousel = match Carousel::mount(&mut document, config.carousel.clone()) {
            Ok(carousel) => Some(carousel),
            Err(e) => {
                warn!("Carousel not mounted, page stays static: {}", e);
                None
            }
        };

        Ok(Self {
            document,
            carousel,
            auto_complete: config.behavior.auto_complete_transitions,
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn carousel(&self) -> Option<&Carousel> {
        self.carousel.as_ref()
    }

    pub fn is_mounted(&self) -> bool {
        self.carousel.is_some()
    }

    /// Apply one signal and produce its response.
    pub fn apply(&mut self, signal: Signal) -> Response {
        match signal {
            Signal::Stop => return Response::Ok,
            Signal::Query => {
                return match &self.carousel {
                    Some(carousel) => state_response(carousel),
                    None => Response::Static,
                };
            }
            Signal::Dispose => {
                return match self.carousel.take() {
                    Some(carousel) => {
                        carousel.dispose(&mut self.document);
                        info!("Carousel disposed");
                        Response::Ok
                    }
                    None => Response::Static,
                };
            }
            _ => {}
        }

        let Some(carousel) = self.carousel.as_mut() else {
            return Response::Static;
        };
        let doc = &mut self.document;

        let response = match signal {
            Signal::Click { target } => dispatch(doc, carousel, target, EventKind::Click),
            Signal::Key { key } => {
                let event = DomEvent::key_down(carousel.wrapper(), key_from_name(key));
                handled(carousel.handle(doc, &event), EventKind::KeyDown)
            }
            Signal::Focus { target } => {
                if let Some(node) = resolve(doc, carousel, target) {
                    doc.focus(node);
                }
                dispatch(doc, carousel, target, EventKind::Focus)
            }
            Signal::Blur { target } => dispatch(doc, carousel, target, EventKind::Blur),
            Signal::Resize { width } => {
                if !width.is_finite() || width < 0.0 {
                    return Response::error(format!("Invalid width: {}", width));
                }
                match doc.resize_element(carousel.wrapper(), width) {
                    Ok(()) => {
                        let event = DomEvent::new(doc.window(), EventKind::Resize);
                        handled(carousel.handle(doc, &event), EventKind::Resize)
                    }
                    Err(e) => Response::error(e.to_string()),
                }
            }
            Signal::TransitionEnd => {
                let pending = doc.take_pending_transitions();
                if pending.is_empty() {
                    Response::error("No transition in flight")
                } else {
                    for node in pending {
                        carousel.handle(doc, &DomEvent::new(node, EventKind::TransitionEnd));
                    }
                    Response::Ok
                }
            }
            Signal::Stop | Signal::Query | Signal::Dispose => Response::Ok,
        };

        if self.auto_complete {
            self.complete_transitions();
        }
        response
    }

    /// Deliver transition-end for every transition the document started.
    pub fn complete_transitions(&mut self) {
        let Some(carousel) = self.carousel.as_mut() else {
            return;
        };
        for node in self.document.take_pending_transitions() {
            debug!("Completing transition on node {}", node);
            carousel.handle(&mut self.document, &DomEvent::new(node, EventKind::TransitionEnd));
        }
    }
}

fn dispatch(doc: &mut Document, carousel: &mut Carousel, target: Target, kind: EventKind) -> Response {
    match resolve(doc, carousel, target) {
        Some(node) => handled(carousel.handle(doc, &DomEvent::new(node, kind)), kind),
        None => Response::error(format!("Unknown target: {:?}", target)),
    }
}

fn handled(accepted: bool, kind: EventKind) -> Response {
    if accepted {
        Response::Ok
    } else {
        Response::error(format!("No {:?} listener on that target", kind))
    }
}

/// Find the document node a protocol target addresses.
fn resolve(doc: &Document, carousel: &Carousel, target: Target) -> Option<NodeId> {
    match target {
        Target::LeftArrow => Some(carousel.left_arrow()),
        Target::RightArrow => Some(carousel.right_arrow()),
        Target::Wrapper => Some(carousel.wrapper()),
        Target::Control { item, index } => {
            let item_class = carousel.options().item_class.as_str();
            let item_node = *doc.query_classes(carousel.content(), &[item_class]).get(item)?;
            carousel
                .controls()
                .iter()
                .copied()
                .filter(|&control| doc.closest_class(control, item_class) == Some(item_node))
                .nth(index)
        }
    }
}

fn key_from_name(name: KeyName) -> Key {
    match name {
        KeyName::Enter => Key::Enter,
        KeyName::Escape => Key::Escape,
        KeyName::ArrowLeft => Key::ArrowLeft,
        KeyName::ArrowRight => Key::ArrowRight,
        KeyName::Other => Key::Other,
    }
}

fn state_response(carousel: &Carousel) -> Response {
    let snapshot = carousel.snapshot();
    Response::State {
        offset: snapshot.offset,
        current_page: snapshot.current_page,
        page_count: snapshot.page_count,
        pagination: snapshot.pagination_text,
        left_enabled: snapshot.left_enabled,
        right_enabled: snapshot.right_enabled,
        busy: snapshot.busy,
        focus: match snapshot.focus {
            FocusState::Unfocused => FocusReport::Unfocused,
            FocusState::WrapperFocused => FocusReport::Wrapper,
            FocusState::ItemFocused { index } => FocusReport::Item { index },
        },
        item_count: snapshot.item_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(item_count: usize) -> Session {
        let mut config = Config::default();
        config.page.item_count = item_count;
        Session::new(&config).unwrap()
    }

    #[test]
    fn test_key_names_map_to_keys() {
        assert_eq!(key_from_name(KeyName::Enter), Key::Enter);
        assert_eq!(key_from_name(KeyName::ArrowRight), Key::ArrowRight);
        assert_eq!(key_from_name(KeyName::Other), Key::Other);
    }

    #[test]
    fn test_resolve_control_targets() {
        let session = session(8);
        let carousel = session.carousel().unwrap();
        let doc = session.document();

        let link = resolve(doc, carousel, Target::Control { item: 2, index: 0 }).unwrap();
        let input = resolve(doc, carousel, Target::Control { item: 2, index: 1 }).unwrap();
        assert!(doc.has_class(link, "link"));
        assert!(doc.has_class(input, "input-text"));

        assert_eq!(resolve(doc, carousel, Target::Control { item: 2, index: 2 }), None);
        assert_eq!(resolve(doc, carousel, Target::Control { item: 8, index: 0 }), None);
    }

    #[test]
    fn test_unmounted_session_is_static() {
        let mut config = Config::default();
        config.carousel.wrapper_id = "missing".to_string();
        let mut session = Session::new(&config).unwrap();

        assert!(!session.is_mounted());
        assert_eq!(session.apply(Signal::Query), Response::Static);
        assert_eq!(
            session.apply(Signal::Click {
                target: Target::RightArrow
            }),
            Response::Static
        );
        assert_eq!(session.apply(Signal::Stop), Response::Ok);
    }

    #[test]
    fn test_invalid_resize_rejected() {
        let mut session = session(8);
        let response = session.apply(Signal::Resize { width: -1.0 });
        assert!(matches!(response, Response::Error { .. }));
    }
}
