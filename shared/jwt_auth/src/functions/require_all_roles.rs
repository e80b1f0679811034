use crate::{error::MissingRoleError, User};

///
/// Validates that user has all required roles.
///
/// ### Errors
/// - [MissingRoleError] when any of the roles is missing
///
pub fn require_all_roles(user: &User, roles: &[&str]) -> Result<(), MissingRoleError> {
    match roles
        .iter()
        .find(|role| !user.roles.iter().any(|user_role| user_role == *role))
    {
        Some(role) => Err(MissingRoleError {
            missing_role: role.to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn user(roles: &[&str]) -> User {
        User::new(
            "auth0|buyer-1".to_string(),
            roles.iter().map(|role| role.to_string()).collect(),
        )
    }

    #[test]
    fn require_all_roles_present() {
        let user = user(&[
            "offline_access",
            "ticket_service_list_all_tickets",
            "uma_authorization",
        ]);

        let result = require_all_roles(&user, &["ticket_service_list_all_tickets"]);

        assert!(result.is_ok());
    }

    #[test]
    fn require_all_roles_one_missing() {
        let user = user(&["ticket_service_list_all_tickets"]);

        let result = require_all_roles(
            &user,
            &["ticket_service_list_all_tickets", "ticket_service_refund"],
        );

        assert!(matches!(
            result,
            Err(MissingRoleError { missing_role }) if missing_role == "ticket_service_refund"
        ));
    }

    #[test]
    fn require_all_roles_user_without_roles() {
        let result = require_all_roles(&user(&[]), &["ticket_service_list_all_tickets"]);

        assert!(result.is_err());
    }

    #[test]
    fn require_no_roles() {
        assert!(require_all_roles(&user(&[]), &[]).is_ok());
    }
}
