//! Screen View Model
//!
//! Everything a host needs to draw the current screen, built from the
//! [`Controller`]. Names are the accessible names of the rendered controls.

use serde::Serialize;

use crate::application::confirm_sign_up::ConfirmSignUpForm;
use crate::application::controller::{Controller, Page};
use crate::application::form::{FormState, PasswordVisibility};
use crate::application::sign_in::SignInForm;
use crate::application::sign_up::SignUpForm;
use crate::domain::entity::session::Session;
use crate::domain::value_object::field::{Field, InputType};
use crate::presentation::avatar::AvatarView;

pub const HEADING: &str = "Football Organizer";
pub const HOMEPAGE: &str = "Homepage";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Screen {
    pub path: String,
    pub banner: Banner,
    pub content: Content,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Banner {
    pub heading: &'static str,
    pub actions: Vec<BannerAction>,
    /// Account menu items while the menu is open
    pub menu: Vec<MenuItemView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BannerAction {
    Link {
        name: &'static str,
        href: &'static str,
    },
    Account {
        name: &'static str,
        avatar: AvatarView,
        expanded: bool,
    },
}

impl BannerAction {
    pub fn name(&self) -> &'static str {
        match self {
            BannerAction::Link { name, .. } | BannerAction::Account { name, .. } => *name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItemView {
    pub name: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Content {
    Home { text: &'static str },
    Form(FormView),
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormView {
    pub name: &'static str,
    pub title: &'static str,
    pub subheader: Option<String>,
    pub fields: Vec<FieldView>,
    pub buttons: Vec<ButtonView>,
    pub busy: bool,
    pub progress: Option<&'static str>,
    pub alert: Option<&'static str>,
    pub notice: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldView {
    pub field: Field,
    pub label: &'static str,
    pub value: String,
    pub input_type: InputType,
    pub required: bool,
    pub error: Option<&'static str>,
    /// Show/hide toggle of password inputs
    pub toggle: Option<ButtonView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ButtonView {
    pub name: &'static str,
    pub enabled: bool,
}

impl ButtonView {
    fn new(name: &'static str, enabled: bool) -> Self {
        Self { name, enabled }
    }
}

impl Screen {
    /// Build the screen for the controller's current state
    pub fn build(controller: &Controller) -> Self {
        Self {
            path: controller.location().path(),
            banner: banner(controller),
            content: content(controller.page()),
        }
    }

    pub fn form(&self) -> Option<&FormView> {
        match &self.content {
            Content::Form(form) => Some(form),
            _ => None,
        }
    }

    pub fn is_home(&self) -> bool {
        matches!(self.content, Content::Home { .. })
    }

    /// Banner action by accessible name
    pub fn action(&self, name: &str) -> Option<&BannerAction> {
        self.banner.actions.iter().find(|a| a.name() == name)
    }

    pub fn avatar(&self) -> Option<&AvatarView> {
        self.banner.actions.iter().find_map(|a| match a {
            BannerAction::Account { avatar, .. } => Some(avatar),
            _ => None,
        })
    }

    pub fn menu_item(&self, name: &str) -> Option<&MenuItemView> {
        self.banner.menu.iter().find(|item| item.name == name)
    }

    /// Form button, including password toggles, by accessible name
    pub fn button(&self, name: &str) -> Option<&ButtonView> {
        let form = self.form()?;
        form.buttons
            .iter()
            .chain(form.fields.iter().filter_map(|f| f.toggle.as_ref()))
            .find(|b| b.name == name)
    }

    pub fn field(&self, label: &str) -> Option<&FieldView> {
        self.form()?.fields.iter().find(|f| f.label == label)
    }
}

fn banner(controller: &Controller) -> Banner {
    let (actions, menu) = match controller.session() {
        Session::Unknown => (Vec::new(), Vec::new()),
        Session::Anonymous => (
            vec![
                BannerAction::Link {
                    name: "Sign in",
                    href: "/login",
                },
                BannerAction::Link {
                    name: "Sign up",
                    href: "/signup",
                },
            ],
            Vec::new(),
        ),
        Session::Authenticated(user) => {
            let open = controller.account_menu_open();
            let menu = if open {
                vec![
                    MenuItemView { name: "My account" },
                    MenuItemView { name: "Sign out" },
                ]
            } else {
                Vec::new()
            };
            let account = BannerAction::Account {
                name: "Account",
                avatar: AvatarView::for_user(user),
                expanded: open,
            };
            (vec![account], menu)
        }
    };

    Banner {
        heading: HEADING,
        actions,
        menu,
    }
}

fn content(page: &Page) -> Content {
    match page {
        Page::Home => Content::Home { text: HOMEPAGE },
        Page::SignIn(form) => Content::Form(FormView {
            name: SignInForm::NAME,
            title: SignInForm::TITLE,
            subheader: None,
            fields: fields(form.state(), Some(form.password_visibility())),
            buttons: vec![ButtonView::new("Submit", form.can_submit())],
            busy: form.is_busy(),
            progress: form.is_busy().then_some(SignInForm::PROGRESS),
            alert: form.state().alert(),
            notice: None,
        }),
        Page::SignUp(form) => Content::Form(FormView {
            name: SignUpForm::NAME,
            title: SignUpForm::TITLE,
            subheader: None,
            fields: fields(form.state(), Some(form.password_visibility())),
            buttons: vec![ButtonView::new("Submit", form.can_submit())],
            busy: form.is_busy(),
            progress: form.is_busy().then_some(SignUpForm::PROGRESS),
            alert: form.state().alert(),
            notice: None,
        }),
        Page::Confirm(form) => Content::Form(FormView {
            name: ConfirmSignUpForm::NAME,
            title: ConfirmSignUpForm::TITLE,
            subheader: Some(form.subheader()),
            fields: fields(form.state(), None),
            buttons: vec![
                ButtonView::new("Confirm", form.can_submit()),
                ButtonView::new("Resend Code", form.can_resend()),
            ],
            busy: form.is_busy(),
            progress: form.progress_label(),
            alert: form.state().alert(),
            notice: form
                .delivery()
                .map(|d| format!("Code sent by {} to {}", d.medium, d.destination)),
        }),
        Page::NotFound => Content::Empty,
    }
}

fn fields(state: &FormState, password: Option<PasswordVisibility>) -> Vec<FieldView> {
    state
        .fields()
        .iter()
        .map(|&field| {
            let mut input_type = field.input_type();
            let mut toggle = None;
            if let (InputType::Password, Some(visibility)) = (input_type, password) {
                if visibility.is_shown() {
                    input_type = InputType::Text;
                }
                toggle = Some(ButtonView::new(visibility.toggle_label(), true));
            }
            FieldView {
                field,
                label: field.label(),
                value: state.value(field).to_string(),
                input_type,
                required: true,
                error: state.error(field),
                toggle,
            }
        })
        .collect()
}
