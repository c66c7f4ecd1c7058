//! Role-gated routing.
//!
//! [`decide`] is the whole policy: a pure function from the authentication
//! status and the route's guard kind to a [`Decision`]. [`RouteGuard`] is
//! the host-side wrapper that turns decisions into navigation, issuing a
//! redirect once per state and user rather than on every render.

use serde::Serialize;

use crate::auth::{AuthContext, AuthStatus, AuthenticatedUser, Role};

/// Where unauthenticated visitors are sent.
pub const PUBLIC_PATH: &str = "/";

/// Where signed-in users without the required role are sent.
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Which users a guarded route admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GuardKind {
    Student,
    Astrologer,
    /// Any signed-in user, whatever the role.
    Authenticated,
}

impl GuardKind {
    #[must_use]
    pub const fn required_role(self) -> Option<Role> {
        match self {
            Self::Student => Some(Role::Student),
            Self::Astrologer => Some(Role::Astrologer),
            Self::Authenticated => None,
        }
    }

    /// Parse a guard name as given on the command line.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "student" => Some(Self::Student),
            "astrologer" => Some(Self::Astrologer),
            "authenticated" | "auth" | "any" => Some(Self::Authenticated),
            _ => None,
        }
    }
}

/// Where a route stands for the current authentication status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GuardState {
    Loading,
    Unauthenticated,
    WrongRole,
    Authorized,
}

impl GuardState {
    #[must_use]
    pub fn evaluate(status: &AuthStatus, kind: GuardKind) -> Self {
        if status.is_loading {
            return Self::Loading;
        }

        let Some(user) = &status.user else {
            return Self::Unauthenticated;
        };

        match kind.required_role() {
            Some(required) if user.role != required => Self::WrongRole,
            _ => Self::Authorized,
        }
    }

    #[must_use]
    pub const fn decision(self) -> Decision {
        match self {
            Self::Loading => Decision::Wait,
            Self::Unauthenticated => Decision::RedirectTo(PUBLIC_PATH),
            Self::WrongRole => Decision::RedirectTo(DASHBOARD_PATH),
            Self::Authorized => Decision::Render,
        }
    }
}

/// What the host should do with a guarded route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "path", rename_all = "kebab-case")]
pub enum Decision {
    /// Show a waiting indicator; do not navigate yet.
    Wait,
    Render,
    RedirectTo(&'static str),
}

#[must_use]
pub fn decide(status: &AuthStatus, kind: GuardKind) -> Decision {
    GuardState::evaluate(status, kind).decision()
}

/// Router hook used to perform redirects.
pub trait Navigator {
    fn navigate(&mut self, path: &str);
}

/// Records every requested path.
impl Navigator for Vec<String> {
    fn navigate(&mut self, path: &str) {
        self.push(path.to_string());
    }
}

/// A user-visible message raised alongside a redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub title: &'static str,
    pub message: &'static str,
}

impl Notice {
    #[must_use]
    pub const fn sign_in_required() -> Self {
        Self {
            title: "Authentication required",
            message: "Please sign in to access this page.",
        }
    }
}

pub trait Notifier {
    fn notify(&mut self, notice: Notice);
}

impl Notifier for Vec<Notice> {
    fn notify(&mut self, notice: Notice) {
        self.push(notice);
    }
}

/// Discards notices.
impl Notifier for () {
    fn notify(&mut self, _notice: Notice) {}
}

/// Result of rendering a guarded route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered<C> {
    Loading,
    Content(C),
    /// A redirect is pending; nothing is shown.
    Nothing,
}

/// Stateful guard for one mounted route.
///
/// Call [`RouteGuard::render`] whenever the authentication context changes.
/// Redirects fire when the guard enters an unauthenticated or wrong-role
/// state, or when the signed-in user changes while it stays in one. Repeated
/// renders with the same user and state navigate only once.
#[derive(Debug)]
pub struct RouteGuard<N, T = ()> {
    kind: GuardKind,
    navigator: N,
    notifier: T,
    last_state: Option<GuardState>,
    last_user: Option<AuthenticatedUser>,
}

impl<N: Navigator> RouteGuard<N> {
    #[must_use]
    pub const fn new(kind: GuardKind, navigator: N) -> Self {
        Self::with_notifier(kind, navigator, ())
    }
}

impl<N: Navigator, T: Notifier> RouteGuard<N, T> {
    #[must_use]
    pub const fn with_notifier(kind: GuardKind, navigator: N, notifier: T) -> Self {
        Self {
            kind,
            navigator,
            notifier,
            last_state: None,
            last_user: None,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> GuardKind {
        self.kind
    }

    #[must_use]
    pub const fn state(&self) -> Option<GuardState> {
        self.last_state
    }

    #[must_use]
    pub const fn navigator(&self) -> &N {
        &self.navigator
    }

    #[must_use]
    pub const fn notifier(&self) -> &T {
        &self.notifier
    }

    /// Evaluate `auth` and render `content` if the route is authorized.
    ///
    /// `content` is only invoked in the authorized state.
    pub fn render<A, C, F>(&mut self, auth: &A, content: F) -> Rendered<C>
    where
        A: AuthContext + ?Sized,
        F: FnOnce() -> C,
    {
        let status = auth.status();
        let state = GuardState::evaluate(&status, self.kind);
        let entered = self.last_state != Some(state) || self.last_user != status.user;
        self.last_state = Some(state);
        self.last_user = status.user;

        match state.decision() {
            Decision::Wait => Rendered::Loading,
            Decision::Render => Rendered::Content(content()),
            Decision::RedirectTo(path) => {
                if entered {
                    log::info!(
                        "{:?} route: {:?}, redirecting to {}",
                        self.kind,
                        state,
                        path
                    );
                    if state == GuardState::Unauthenticated {
                        self.notifier.notify(Notice::sign_in_required());
                    }
                    self.navigator.navigate(path);
                }
                Rendered::Nothing
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> AuthStatus {
        AuthStatus::signed_in(AuthenticatedUser::new("u1", role))
    }

    #[test]
    fn test_decide_loading_waits() {
        for kind in [GuardKind::Student, GuardKind::Astrologer, GuardKind::Authenticated] {
            assert_eq!(decide(&AuthStatus::loading(), kind), Decision::Wait);
        }
    }

    #[test]
    fn test_decide_signed_out_goes_public() {
        assert_eq!(
            decide(&AuthStatus::signed_out(), GuardKind::Authenticated),
            Decision::RedirectTo(PUBLIC_PATH)
        );
    }

    #[test]
    fn test_decide_wrong_role_goes_to_dashboard() {
        assert_eq!(
            decide(&user(Role::Doctor), GuardKind::Student),
            Decision::RedirectTo(DASHBOARD_PATH)
        );
        assert_eq!(
            decide(&user(Role::Student), GuardKind::Astrologer),
            Decision::RedirectTo(DASHBOARD_PATH)
        );
    }

    #[test]
    fn test_decide_matching_role_renders() {
        assert_eq!(decide(&user(Role::Student), GuardKind::Student), Decision::Render);
        assert_eq!(decide(&user(Role::Astrologer), GuardKind::Astrologer), Decision::Render);
    }

    #[test]
    fn test_authenticated_guard_admits_any_role() {
        for role in [Role::Doctor, Role::Admin, Role::Other("guest".to_string())] {
            assert_eq!(decide(&user(role), GuardKind::Authenticated), Decision::Render);
        }
    }

    #[test]
    fn test_loading_with_stale_user_still_waits() {
        let mut status = user(Role::Doctor);
        status.is_loading = true;
        assert_eq!(decide(&status, GuardKind::Student), Decision::Wait);
    }

    #[test]
    fn test_guard_kind_parse() {
        assert_eq!(GuardKind::parse("Student"), Some(GuardKind::Student));
        assert_eq!(GuardKind::parse("authenticated"), Some(GuardKind::Authenticated));
        assert_eq!(GuardKind::parse("doctor"), None);
    }

    #[test]
    fn test_decision_serializes_with_path() {
        let json = serde_json::to_value(Decision::RedirectTo("/")).unwrap();
        assert_eq!(json["action"], "redirect-to");
        assert_eq!(json["path"], "/");
    }
}
