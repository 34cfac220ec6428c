//! UI flags. All changes are synchronous.

use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiState {
    pub dark_mode: bool,
    pub sidebar_open: bool,
    pub mobile_menu_open: bool,
    pub cart_open: bool,
    pub search_open: bool,
    pub toast: Option<Toast>,
}

#[derive(Debug)]
pub struct UiSlice {
    state: watch::Sender<UiState>,
}

impl Default for UiSlice {
    fn default() -> Self {
        let (state, _) = watch::channel(UiState::default());
        Self { state }
    }
}

impl UiSlice {
    fn set(&self, change: impl FnOnce(&mut UiState)) {
        self.state.send_modify(change);
    }

    pub fn toggle_dark_mode(&self) {
        self.set(|ui| ui.dark_mode = !ui.dark_mode);
    }

    pub fn set_dark_mode(&self, on: bool) {
        self.set(|ui| ui.dark_mode = on);
    }

    pub fn toggle_sidebar(&self) {
        self.set(|ui| ui.sidebar_open = !ui.sidebar_open);
    }

    pub fn set_sidebar_open(&self, open: bool) {
        self.set(|ui| ui.sidebar_open = open);
    }

    pub fn toggle_mobile_menu(&self) {
        self.set(|ui| ui.mobile_menu_open = !ui.mobile_menu_open);
    }

    pub fn set_mobile_menu_open(&self, open: bool) {
        self.set(|ui| ui.mobile_menu_open = open);
    }

    pub fn toggle_cart(&self) {
        self.set(|ui| ui.cart_open = !ui.cart_open);
    }

    pub fn toggle_search(&self) {
        self.set(|ui| ui.search_open = !ui.search_open);
    }

    /// Show a toast, replacing any visible one.
    pub fn show_toast(&self, message: impl Into<String>, kind: ToastKind) {
        let toast = Toast {
            message: message.into(),
            kind,
        };
        self.set(|ui| ui.toast = Some(toast));
    }

    pub fn hide_toast(&self) {
        self.set(|ui| ui.toast = None);
    }

    #[must_use]
    pub fn snapshot(&self) -> UiState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<UiState> {
        self.state.subscribe()
    }
}
