use anyhow::Result;
use serde_json::{json, Value};

use sangeet_core::{decide, AuthStatus, AuthenticatedUser, Decision, GuardKind, GuardState, Role};

/// Print what a guarded route would do for a given authentication status.
pub fn check_guard(
    route: &str,
    role: Option<String>,
    signed_out: bool,
    loading: bool,
    json: bool,
) -> Result<()> {
    let Some(kind) = GuardKind::parse(route) else {
        anyhow::bail!(
            "Unknown route guard: {}\n\nValid guards: student, astrologer, authenticated",
            route
        );
    };

    let status = if loading {
        AuthStatus::loading()
    } else if signed_out {
        AuthStatus::signed_out()
    } else if let Some(role) = role {
        AuthStatus::signed_in(AuthenticatedUser::new("cli-user", Role::from(role)))
    } else {
        anyhow::bail!("Pass --role <ROLE>, --signed-out or --loading");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report(&status, kind))?);
        return Ok(());
    }

    let state = GuardState::evaluate(&status, kind);
    let decision = decide(&status, kind);
    let dashboard = status.role().map(Role::dashboard_path);

    println!("Guard:    {:?}", kind);
    println!("State:    {:?}", state);
    match decision {
        Decision::Wait => println!("Decision: show loading indicator"),
        Decision::Render => println!("Decision: render page"),
        Decision::RedirectTo(path) => println!("Decision: redirect to {}", path),
    }
    if let Some(dashboard) = dashboard {
        println!("Home:     {}", dashboard);
    }

    Ok(())
}

/// Machine-readable outcome, including the role's own dashboard when signed in.
fn report(status: &AuthStatus, kind: GuardKind) -> Value {
    json!({
        "guard": kind,
        "state": GuardState::evaluate(status, kind),
        "decision": decide(status, kind),
        "dashboard": status.role().map(Role::dashboard_path),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_in(role: Role) -> AuthStatus {
        AuthStatus::signed_in(AuthenticatedUser::new("u1", role))
    }

    #[test]
    fn test_report_for_wrong_role() {
        let value = report(&signed_in(Role::Doctor), GuardKind::Student);
        assert_eq!(value["decision"]["action"], "redirect-to");
        assert_eq!(value["decision"]["path"], "/dashboard");
        assert_eq!(value["dashboard"], "/doctor");
    }

    #[test]
    fn test_report_when_signed_out() {
        let value = report(&AuthStatus::signed_out(), GuardKind::Authenticated);
        assert_eq!(value["decision"]["path"], "/");
        assert!(value["dashboard"].is_null());
    }

    #[test]
    fn test_unknown_route_is_rejected() {
        assert!(check_guard("guru", None, true, false, false).is_err());
    }
}
