use serde::Serialize;
use tracing::{debug, info};

use crate::capture::TranscriptDelivery;
use crate::cart::{reconcile, Cart};
use crate::catalog::Catalog;
use crate::config::KioskSettings;
use crate::extract::{extract_operations_with_names, guarded_item_names};
use crate::matcher::MenuMatcher;
use crate::operation::{resolve_item_id, resolve_operations, ResolvedOperation};
use crate::postprocess::is_duplicate_transcript;

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ListeningState {
    #[default]
    Idle,
    Listening,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct SessionState {
    pub listening: ListeningState,
    pub last_processed_transcript: Option<String>,
    pub cart: Cart,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionInput {
    Transcript(String),
    /// Start signal from a button or the capture engine.
    StartCapture,
    StopCapture,
    /// The host cleared its recognizer buffer; the next text is new speech.
    ResetCapture,
    ManualAdd { item_id: String, quantity: u32 },
    ManualRemove { item_id: String, quantity: Option<u32> },
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Navigation {
    ToCart,
    ToMenu,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    Applied,
    /// Same text as the last processed transcript.
    Duplicate,
    /// Heard while idle; nothing but a start command is honored.
    Gated,
    Empty,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SessionOutcome {
    pub disposition: Disposition,
    pub listening: ListeningState,
    pub cart: Cart,
    pub status_message: String,
    pub navigation: Option<Navigation>,
    /// Ask the capture host to clear its transcript buffer.
    pub clear_capture_buffer: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: SessionState,
    pub outcome: SessionOutcome,
}

pub fn transition(
    state: &SessionState,
    catalog: &Catalog,
    matcher: &MenuMatcher,
    input: SessionInput,
) -> Transition {
    match input {
        SessionInput::Transcript(text) => transcript_transition(state, catalog, matcher, &text),
        SessionInput::StartCapture => {
            let next = SessionState {
                listening: ListeningState::Listening,
                last_processed_transcript: None,
                cart: state.cart.clone(),
            };
            if state.listening == ListeningState::Idle {
                info!("session listening");
            }
            settled(next, Disposition::Applied, "Listening.".to_string(), None, false)
        }
        SessionInput::StopCapture => {
            let next = SessionState {
                listening: ListeningState::Idle,
                last_processed_transcript: None,
                cart: state.cart.clone(),
            };
            if state.listening == ListeningState::Listening {
                info!("session idle");
            }
            settled(next, Disposition::Applied, "Stopped listening.".to_string(), None, false)
        }
        SessionInput::ResetCapture => {
            let next = SessionState {
                last_processed_transcript: None,
                ..state.clone()
            };
            settled(next, Disposition::Applied, String::new(), None, false)
        }
        SessionInput::ManualAdd { item_id, quantity } => {
            let operation = ResolvedOperation::Add {
                resolution: resolve_item_id(&item_id, catalog),
                quantity,
            };
            manual_transition(state, operation)
        }
        SessionInput::ManualRemove { item_id, quantity } => {
            let operation = ResolvedOperation::Remove {
                resolution: resolve_item_id(&item_id, catalog),
                quantity,
            };
            manual_transition(state, operation)
        }
    }
}

fn transcript_transition(
    state: &SessionState,
    catalog: &Catalog,
    matcher: &MenuMatcher,
    text: &str,
) -> Transition {
    if text.trim().is_empty() {
        return settled(state.clone(), Disposition::Empty, String::new(), None, false);
    }
    if is_duplicate_transcript(state.last_processed_transcript.as_deref(), text) {
        debug!(transcript = text, "skipping duplicate transcript");
        return settled(state.clone(), Disposition::Duplicate, String::new(), None, false);
    }

    let parsed = extract_operations_with_names(text, &guarded_item_names(catalog));
    let resolved = resolve_operations(&parsed, catalog, matcher);

    let mut listening = state.listening;
    let mut cart = state.cart.clone();
    let mut messages: Vec<String> = Vec::new();
    let mut navigation = None;
    let mut honored = false;

    for operation in resolved {
        match operation {
            ResolvedOperation::StartCapture => {
                honored = true;
                if listening == ListeningState::Idle {
                    listening = ListeningState::Listening;
                    info!("session listening (spoken)");
                    messages.push("Listening.".to_string());
                }
            }
            _ if listening == ListeningState::Idle => {
                debug!(?operation, "ignoring operation while idle");
            }
            ResolvedOperation::StopCapture => {
                honored = true;
                listening = ListeningState::Idle;
                info!("session idle (spoken)");
                messages.push("Stopped listening.".to_string());
                break;
            }
            ResolvedOperation::NavigateToCart => {
                honored = true;
                navigation = Some(Navigation::ToCart);
            }
            ResolvedOperation::NavigateToMenu => {
                honored = true;
                navigation = Some(Navigation::ToMenu);
            }
            operation => {
                honored = true;
                let reconciliation = reconcile(&cart, std::slice::from_ref(&operation));
                cart = reconciliation.cart;
                messages.extend(reconciliation.messages);
            }
        }
    }

    let next = SessionState {
        listening,
        last_processed_transcript: Some(text.to_string()),
        cart,
    };
    if !honored {
        return settled(next, Disposition::Gated, String::new(), None, false);
    }
    settled(next, Disposition::Applied, messages.join(" "), navigation, true)
}

fn manual_transition(state: &SessionState, operation: ResolvedOperation) -> Transition {
    let reconciliation = reconcile(&state.cart, std::slice::from_ref(&operation));
    let status = reconciliation.status();
    let next = SessionState {
        cart: reconciliation.cart,
        ..state.clone()
    };
    settled(next, Disposition::Applied, status, None, false)
}

fn settled(
    state: SessionState,
    disposition: Disposition,
    status_message: String,
    navigation: Option<Navigation>,
    clear_capture_buffer: bool,
) -> Transition {
    let outcome = SessionOutcome {
        disposition,
        listening: state.listening,
        cart: state.cart.clone(),
        status_message,
        navigation,
        clear_capture_buffer,
    };
    Transition { state, outcome }
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineStatus {
    pub listening: ListeningState,
    pub cart_items: u64,
}

/// One kiosk session. Methods take `&mut self`, so a host that receives
/// transcripts from several threads must put the pipeline behind a lock.
pub struct KioskPipeline {
    catalog: Catalog,
    matcher: MenuMatcher,
    state: SessionState,
}

impl KioskPipeline {
    pub fn new(catalog: Catalog, matcher: MenuMatcher) -> Self {
        Self {
            catalog,
            matcher,
            state: SessionState::default(),
        }
    }

    pub fn from_settings(catalog: Catalog, settings: &KioskSettings) -> Self {
        Self::new(catalog, MenuMatcher::from_settings(settings))
    }

    pub fn status(&self) -> PipelineStatus {
        PipelineStatus {
            listening: self.state.listening,
            cart_items: self.state.cart.total_items(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn cart(&self) -> &Cart {
        &self.state.cart
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn apply(&mut self, input: SessionInput) -> SessionOutcome {
        let Transition { state, outcome } =
            transition(&self.state, &self.catalog, &self.matcher, input);
        self.state = state;
        outcome
    }

    pub fn process_transcript(&mut self, text: &str) -> SessionOutcome {
        self.apply(SessionInput::Transcript(text.to_string()))
    }

    /// Interim hypotheses are dropped; only finished text is interpreted.
    pub fn on_delivery(&mut self, delivery: &TranscriptDelivery) -> Option<SessionOutcome> {
        if !delivery.is_final {
            return None;
        }
        Some(self.process_transcript(&delivery.text))
    }

    pub fn start_capture(&mut self) -> SessionOutcome {
        self.apply(SessionInput::StartCapture)
    }

    pub fn stop_capture(&mut self) -> SessionOutcome {
        self.apply(SessionInput::StopCapture)
    }

    pub fn reset_capture(&mut self) -> SessionOutcome {
        self.apply(SessionInput::ResetCapture)
    }

    pub fn manual_add(&mut self, item_id: &str, quantity: u32) -> SessionOutcome {
        self.apply(SessionInput::ManualAdd {
            item_id: item_id.to_string(),
            quantity,
        })
    }

    pub fn manual_remove(&mut self, item_id: &str, quantity: Option<u32>) -> SessionOutcome {
        self.apply(SessionInput::ManualRemove {
            item_id: item_id.to_string(),
            quantity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{default_catalog, CatalogItem};

    fn listening_pipeline() -> KioskPipeline {
        let mut pipeline = KioskPipeline::new(default_catalog(), MenuMatcher::default());
        pipeline.start_capture();
        pipeline
    }

    fn quantities(pipeline: &KioskPipeline) -> Vec<(String, u32)> {
        pipeline
            .cart()
            .entries()
            .iter()
            .map(|entry| (entry.name.clone(), entry.quantity))
            .collect()
    }

    #[test]
    fn starts_idle_with_empty_cart() {
        let pipeline = KioskPipeline::new(default_catalog(), MenuMatcher::default());
        assert_eq!(pipeline.status().listening, ListeningState::Idle);
        assert!(pipeline.cart().is_empty());
        assert!(pipeline.state().last_processed_transcript.is_none());
    }

    #[test]
    fn adds_several_items_from_one_utterance() {
        let mut pipeline = listening_pipeline();
        let outcome = pipeline.process_transcript("2 idli 3 mango lassi");

        assert_eq!(outcome.disposition, Disposition::Applied);
        assert_eq!(
            quantities(&pipeline),
            vec![
                ("Idli Sambhar".to_string(), 2),
                ("Mango Lassi".to_string(), 3)
            ]
        );
        assert_eq!(
            outcome.status_message,
            "Added 2 Idli Sambhar to your cart. Added 3 Mango Lassi to your cart."
        );
    }

    #[test]
    fn removes_a_counted_quantity() {
        let mut pipeline = listening_pipeline();
        pipeline.manual_add("gulab-jamun", 3);
        pipeline.process_transcript("remove 1 gulab jamun");
        assert_eq!(quantities(&pipeline), vec![("Gulab Jamun".to_string(), 2)]);
    }

    #[test]
    fn removes_an_entry_entirely() {
        let mut pipeline = listening_pipeline();
        pipeline.manual_add("mango-lassi", 2);
        pipeline.process_transcript("remove mango lassi");
        assert!(pipeline.cart().is_empty());
    }

    #[test]
    fn every_remove_keyword_lowers_the_cart() {
        for keyword in ["remove", "delete", "cancel", "take off"] {
            let mut pipeline = listening_pipeline();
            pipeline.manual_add("masala-dosa", 3);

            let outcome = pipeline.process_transcript(&format!("{keyword} 1 dosa"));
            assert_eq!(outcome.status_message, "Removed 1 Masala Dosa from your cart.");
            assert_eq!(pipeline.cart().quantity_of("masala-dosa"), Some(2), "{keyword}");

            pipeline.process_transcript(&format!("{keyword} the dosa"));
            assert_eq!(pipeline.cart().quantity_of("masala-dosa"), None, "{keyword}");
        }
    }

    #[test]
    fn short_noise_words_do_not_touch_the_cart() {
        let mut pipeline = listening_pipeline();
        for noise in ["as", "la", "sa", "ken"] {
            let outcome = pipeline.process_transcript(noise);
            assert_eq!(
                outcome.status_message,
                format!("Item \"{noise}\" not found in menu.")
            );
        }
        assert!(pipeline.cart().is_empty());
    }

    #[test]
    fn add_more_with_an_item_adds_without_navigating() {
        let mut pipeline = listening_pipeline();
        let outcome = pipeline.process_transcript("add more idli");
        assert_eq!(outcome.navigation, None);
        assert_eq!(pipeline.cart().quantity_of("idli-sambhar"), Some(1));

        let outcome = pipeline.process_transcript("add more");
        assert_eq!(outcome.navigation, Some(Navigation::ToMenu));
    }

    #[test]
    fn catalog_names_with_stop_words_resolve_whole() {
        let catalog = Catalog::new(vec![
            CatalogItem {
                id: "chicken-rice".to_string(),
                name: "Chicken with Rice".to_string(),
                price: 180.0,
                category: "Mains".to_string(),
            },
            CatalogItem {
                id: "rice-bowl".to_string(),
                name: "Rice Bowl".to_string(),
                price: 90.0,
                category: "Mains".to_string(),
            },
        ])
        .expect("catalog should be valid");
        let mut pipeline = KioskPipeline::new(catalog, MenuMatcher::default());
        pipeline.start_capture();

        pipeline.process_transcript("2 chicken with rice");
        assert_eq!(pipeline.cart().quantity_of("chicken-rice"), Some(2));
        assert_eq!(pipeline.cart().quantity_of("rice-bowl"), None);
    }

    #[test]
    fn resolves_misspelled_items() {
        let mut pipeline = listening_pipeline();
        pipeline.process_transcript("buter chiken");
        assert_eq!(quantities(&pipeline), vec![("Butter Chicken".to_string(), 1)]);
    }

    #[test]
    fn unknown_item_reports_without_mutation() {
        let mut pipeline = listening_pipeline();
        let outcome = pipeline.process_transcript("xyzfood");
        assert!(pipeline.cart().is_empty());
        assert_eq!(outcome.status_message, "Item \"xyzfood\" not found in menu.");
    }

    #[test]
    fn identical_transcript_is_processed_once() {
        let mut pipeline = listening_pipeline();
        pipeline.process_transcript("2 idli");
        let repeat = pipeline.process_transcript("2 idli");

        assert_eq!(repeat.disposition, Disposition::Duplicate);
        assert_eq!(pipeline.cart().quantity_of("idli-sambhar"), Some(2));
    }

    #[test]
    fn guard_reset_allows_identical_followup() {
        let mut pipeline = listening_pipeline();
        let first = pipeline.process_transcript("2 idli");
        assert!(first.clear_capture_buffer);

        pipeline.reset_capture();
        pipeline.process_transcript("2 idli");
        assert_eq!(pipeline.cart().quantity_of("idli-sambhar"), Some(4));
    }

    #[test]
    fn idle_session_ignores_everything_but_start() {
        let mut pipeline = KioskPipeline::new(default_catalog(), MenuMatcher::default());
        let outcome = pipeline.process_transcript("2 idli and go to cart");

        assert_eq!(outcome.disposition, Disposition::Gated);
        assert!(outcome.navigation.is_none());
        assert!(pipeline.cart().is_empty());
    }

    #[test]
    fn spoken_start_enables_following_operations() {
        let mut pipeline = KioskPipeline::new(default_catalog(), MenuMatcher::default());
        let outcome = pipeline.process_transcript("start recording and add 2 vada");

        assert_eq!(outcome.listening, ListeningState::Listening);
        assert_eq!(pipeline.cart().quantity_of("medu-vada"), Some(2));
    }

    #[test]
    fn spoken_stop_drops_the_rest_of_the_utterance() {
        let mut pipeline = listening_pipeline();
        let outcome = pipeline.process_transcript("2 idli stop listening 3 dosa");

        assert_eq!(outcome.listening, ListeningState::Idle);
        assert_eq!(pipeline.cart().quantity_of("idli-sambhar"), Some(2));
        assert_eq!(pipeline.cart().quantity_of("masala-dosa"), None);
    }

    #[test]
    fn later_navigation_wins() {
        let mut pipeline = listening_pipeline();
        let outcome = pipeline.process_transcript("show cart. back to menu");
        assert_eq!(outcome.navigation, Some(Navigation::ToMenu));
    }

    #[test]
    fn reset_clears_cart_by_voice() {
        let mut pipeline = listening_pipeline();
        pipeline.process_transcript("2 idli and 1 rasmalai");
        let outcome = pipeline.process_transcript("clear cart");
        assert!(pipeline.cart().is_empty());
        assert_eq!(outcome.status_message, "Your cart is now empty.");
    }

    #[test]
    fn manual_add_works_while_idle() {
        let mut pipeline = KioskPipeline::new(default_catalog(), MenuMatcher::default());
        let outcome = pipeline.manual_add("masala-chai", 2);
        assert_eq!(outcome.status_message, "Added 2 Masala Chai to your cart.");
        assert_eq!(pipeline.cart().quantity_of("masala-chai"), Some(2));
    }

    #[test]
    fn manual_add_of_unknown_id_is_reported() {
        let mut pipeline = KioskPipeline::new(default_catalog(), MenuMatcher::default());
        let outcome = pipeline.manual_add("pizza", 1);
        assert_eq!(outcome.status_message, "Item \"pizza\" not found in menu.");
        assert!(pipeline.cart().is_empty());
    }

    #[test]
    fn stop_signal_clears_guard_and_goes_idle() {
        let mut pipeline = listening_pipeline();
        pipeline.process_transcript("2 idli");
        let outcome = pipeline.stop_capture();
        assert_eq!(outcome.listening, ListeningState::Idle);
        assert!(pipeline.state().last_processed_transcript.is_none());
    }

    #[test]
    fn interim_deliveries_are_ignored() {
        let mut pipeline = listening_pipeline();
        assert!(pipeline
            .on_delivery(&TranscriptDelivery::interim("2 id"))
            .is_none());
        let outcome = pipeline
            .on_delivery(&TranscriptDelivery::finished("2 idli"))
            .expect("final delivery should be processed");
        assert_eq!(outcome.disposition, Disposition::Applied);
    }

    #[test]
    fn transition_does_not_touch_input_state() {
        let catalog = default_catalog();
        let matcher = MenuMatcher::default();
        let state = SessionState {
            listening: ListeningState::Listening,
            ..SessionState::default()
        };
        let result = transition(
            &state,
            &catalog,
            &matcher,
            SessionInput::Transcript("3 vada".to_string()),
        );
        assert!(state.cart.is_empty());
        assert_eq!(result.state.cart.quantity_of("medu-vada"), Some(3));
        assert_eq!(result.state.last_processed_transcript.as_deref(), Some("3 vada"));
    }

    #[test]
    fn adversarial_input_never_panics() {
        let mut pipeline = listening_pipeline();
        for text in ["", "   ", "?!?!", "remove", "add", "0 idli", "remove 99 rasmalai"] {
            pipeline.reset_capture();
            let _ = pipeline.process_transcript(text);
        }
        assert!(pipeline.cart().entries().iter().all(|entry| entry.quantity >= 1));
    }
}
