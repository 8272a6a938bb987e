mod common;

use reqwest::{Method, StatusCode};
use serde_json::json;

use common::ScriptedTransport;
use DoneDepConsole::services::api_client::ApiError;
use DoneDepConsole::services::{
    deploy_agent_service, domain_reseller_service, domain_service, native_email_service, stripe_connect_service,
};

#[tokio::test]
async fn user_supplied_segments_are_percent_encoded() {
    let transport = ScriptedTransport::new();
    let (client, _) = common::client(transport.clone());

    let _ = domain_service::get_domain_info(&client, "my app.io").await;
    let _ = domain_reseller_service::get_domain_info(&client, "a/b.com").await;
    let _ = native_email_service::delete_template(&client, "t?1").await;

    assert_eq!(
        transport.paths(),
        vec![
            "/domain/info/my%20app.io",
            "/domain-reseller/a%2Fb.com/info",
            "/native-email/templates/t%3F1",
        ]
    );
}

#[tokio::test]
async fn optional_filters_become_query_parameters() {
    let transport = ScriptedTransport::new();
    let (client, _) = common::client(transport.clone());

    let _ = native_email_service::get_analytics(&client, Some("svc-1"), None).await;
    let _ = stripe_connect_service::get_analytics(&client, "acct_1", Some("30d")).await;
    let _ = stripe_connect_service::get_analytics(&client, "acct_1", None).await;

    let requests = transport.requests();
    assert_eq!(requests[0].query, vec![("serviceId".to_string(), "svc-1".to_string())]);
    assert_eq!(requests[1].path, "/stripe-connect/account/acct_1/analytics");
    assert_eq!(requests[1].query, vec![("period".to_string(), "30d".to_string())]);
    assert!(requests[2].query.is_empty());
}

#[tokio::test]
async fn deploy_agent_stubs_unwrap_the_envelope() {
    let transport = ScriptedTransport::new();
    transport.reply(
        Method::GET,
        "/deployagent/knowledge/stats",
        StatusCode::OK,
        json!({ "success": true, "data": { "totalPatterns": 12, "totalExecutions": 40 } }),
    );
    transport.reply(
        Method::GET,
        "/deployagent/deployments",
        StatusCode::OK,
        json!({ "success": false, "message": "not allowed" }),
    );
    let (client, _) = common::client(transport.clone());

    let stats = deploy_agent_service::get_knowledge_stats(&client).await.unwrap();
    assert_eq!(stats.total_patterns, 12);

    let err = deploy_agent_service::get_deployments(&client, 2, 10).await.unwrap_err();
    assert!(matches!(err, ApiError::Rejected(ref message) if message == "not allowed"));
    assert_eq!(
        transport.requests()[1].query,
        vec![("page".to_string(), "2".to_string()), ("limit".to_string(), "10".to_string())]
    );
}

#[tokio::test]
async fn feedback_returns_acknowledgement_message() {
    let transport = ScriptedTransport::new();
    transport.reply(
        Method::POST,
        "/deployagent/deployments/ctx-1/feedback",
        StatusCode::OK,
        json!({ "success": true, "message": "Thanks for the feedback" }),
    );
    let (client, _) = common::client(transport.clone());

    let message = deploy_agent_service::submit_feedback(&client, "ctx-1", 5, None).await.unwrap();

    assert_eq!(message, "Thanks for the feedback");
    assert_eq!(transport.requests()[0].body, Some(json!({ "rating": 5 })));
}
