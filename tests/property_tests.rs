//! Integration property tests for webscript-container.
//!
//! These tests validate the identity and projection invariants across
//! arbitrary callers, policies and script outcomes.

mod common;

use common::{request, FixedAuthenticator, Harness, Outcome};
use proptest::prelude::*;
use webscript_container::wcm::{
    DeployType, DeploymentServerConfig, PropertyValue, ServerProperties, ServerType,
};
use webscript_container::{
    BufferedResponse, IdentityContext, NodeRef, RequiredAuthentication, RequiredTransaction,
    Secret,
};

// Strategy: Generate arbitrary user names, including the admin
fn arb_user() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("admin".to_string()),
        prop::string::string_regex("[a-z]{3,10}").unwrap(),
    ]
}

fn arb_required() -> impl Strategy<Value = RequiredAuthentication> {
    prop_oneof![
        Just(RequiredAuthentication::Guest),
        Just(RequiredAuthentication::User),
        Just(RequiredAuthentication::Admin),
    ]
}

fn arb_transaction() -> impl Strategy<Value = RequiredTransaction> {
    prop_oneof![
        Just(RequiredTransaction::None),
        Just(RequiredTransaction::Required),
        Just(RequiredTransaction::RequiresNew),
    ]
}

fn arb_outcome() -> impl Strategy<Value = Outcome> {
    prop_oneof![
        Just(Outcome::Succeed),
        Just(Outcome::FailIo),
        Just(Outcome::FailScript),
    ]
}

// Strategy: Text values that are empty about half the time
fn arb_text() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop_oneof![
        Just(String::new()),
        prop::string::string_regex("[a-z0-9./-]{1,12}").unwrap(),
    ])
}

fn arb_properties() -> impl Strategy<Value = ServerProperties> {
    (
        prop::option::of(prop_oneof![Just(ServerType::Live), Just(ServerType::Test)]),
        (arb_text(), arb_text(), arb_text(), arb_text()),
        (arb_text(), arb_text(), arb_text(), arb_text()),
        prop::option::of(any::<u16>()),
        prop::option::of(any::<bool>()),
    )
        .prop_map(|(server_type, first, second, port, on_approval)| {
            let (name, host, username, password) = first;
            let (url, source_path, target_name, allocated_to) = second;
            ServerProperties {
                server_type,
                name,
                host,
                port,
                username,
                password: password.map(Secret::new),
                url,
                source_path,
                target_name,
                allocated_to,
                on_approval,
            }
        })
}

fn arb_deploy_type() -> impl Strategy<Value = DeployType> {
    prop_oneof![Just(DeployType::Alfresco), Just(DeployType::File)]
}

proptest! {
    /// Property: Authenticated invocations restore the caller's identity
    ///
    /// Whatever the prior identity, the required level, the transaction
    /// level, the authenticator's verdict or the script's outcome, the
    /// identity after the call equals the identity before it.
    #[test]
    fn proptest_identity_restored_after_authenticated_call(
        prior in prop::option::of(arb_user()),
        login in prop::option::of(prop_oneof![Just("admin"), Just("bob")]),
        required in arb_required(),
        txn in arb_transaction(),
        outcome in arb_outcome(),
        guest in any::<bool>(),
    ) {
        let harness = Harness::new(&["admin"]);
        let (req, _) = request("prop/script", required, txn, outcome);
        let req = if guest { req.as_guest() } else { req };
        let auth = match login {
            Some(user) => FixedAuthenticator::logs_in(user),
            None => FixedAuthenticator::refuses(),
        };
        let mut identity = match &prior {
            Some(user) => IdentityContext::authenticated(user.clone()),
            None => IdentityContext::new(),
        };

        let _ = harness.container.execute_script(
            &req,
            &mut BufferedResponse::new(),
            &mut identity,
            Some(&auth),
        );

        prop_assert_eq!(identity.current(), prior.as_deref());
    }

    /// Property: Anonymous scripts always leave the identity cleared
    #[test]
    fn proptest_anonymous_call_clears_identity(
        prior in prop::option::of(arb_user()),
        txn in arb_transaction(),
        outcome in arb_outcome(),
    ) {
        let harness = Harness::new(&["admin"]);
        let (req, observed) = request("prop/public", RequiredAuthentication::None, txn, outcome);
        let mut identity = match prior {
            Some(user) => IdentityContext::authenticated(user),
            None => IdentityContext::new(),
        };

        let _ = harness
            .container
            .execute_script(&req, &mut BufferedResponse::new(), &mut identity, None);

        prop_assert!(identity.current().is_none());
        prop_assert_eq!(observed.identity_seen(), Some(None));
    }

    /// Property: Admin scripts only ever run for admins
    #[test]
    fn proptest_admin_script_runs_only_for_admin(
        user in arb_user(),
        txn in arb_transaction(),
    ) {
        let harness = Harness::new(&["admin"]);
        let (req, observed) =
            request("prop/admin", RequiredAuthentication::Admin, txn, Outcome::Succeed);
        let mut identity = IdentityContext::authenticated(user.clone());

        let result = harness
            .container
            .execute_script(&req, &mut BufferedResponse::new(), &mut identity, None);

        if user == "admin" {
            prop_assert!(result.is_ok());
            prop_assert_eq!(observed.calls(), 1);
        } else {
            prop_assert!(result.is_err());
            prop_assert_eq!(observed.calls(), 0);
        }
        prop_assert_eq!(identity.current(), Some(user.as_str()));
    }

    /// Property: The persisted projection never contains empty text
    #[test]
    fn proptest_projection_never_contains_empty_text(
        deploy_type in arb_deploy_type(),
        props in arb_properties(),
    ) {
        let mut config = DeploymentServerConfig::new(deploy_type);
        config.set_properties(props);

        for (qname, value) in config.repo_props() {
            if let PropertyValue::Text(text) = value {
                prop_assert!(!text.is_empty(), "{} projected as empty text", qname);
            }
        }
    }

    /// Property: Reloading a projection keeps every persisted field
    ///
    /// Non-empty text survives, the target name survives only for file
    /// receivers, and the approval flag exists exactly for live servers.
    #[test]
    fn proptest_projection_reloads_consistently(
        deploy_type in arb_deploy_type(),
        props in arb_properties(),
    ) {
        let mut config = DeploymentServerConfig::new(deploy_type);
        config.set_properties(props);
        let original = config.properties();

        let reloaded = DeploymentServerConfig::from_repo_props(
            NodeRef::in_spaces_store("server"),
            &config.repo_props(),
        )
        .unwrap();
        let reloaded_props = reloaded.properties();

        let kept = |value: &Option<String>| value.clone().filter(|s| !s.is_empty());
        prop_assert_eq!(reloaded.deploy_type(), deploy_type);
        prop_assert_eq!(reloaded_props.server_type, original.server_type);
        prop_assert_eq!(reloaded_props.port, original.port);
        prop_assert_eq!(&reloaded_props.host, &kept(&original.host));
        prop_assert_eq!(&reloaded_props.name, &kept(&original.name));
        prop_assert_eq!(&reloaded_props.url, &kept(&original.url));
        prop_assert_eq!(
            reloaded_props.password.as_ref().map(|p| p.expose_secret().clone()),
            original
                .password
                .as_ref()
                .map(|p| p.expose_secret().clone())
                .filter(|s| !s.is_empty())
        );

        let expected_target = match deploy_type {
            DeployType::File => kept(&original.target_name),
            DeployType::Alfresco => None,
        };
        prop_assert_eq!(&reloaded_props.target_name, &expected_target);

        let expected_approval = match original.server_type {
            Some(ServerType::Live) => Some(original.on_approval.unwrap_or(false)),
            _ => None,
        };
        prop_assert_eq!(reloaded_props.on_approval, expected_approval);
    }
}
