mod common;

use reqwest::{Method, StatusCode};
use serde_json::json;

use common::ScriptedTransport;
use DoneDepConsole::models::deploy_agent::{DeploymentRepository, DeploymentRequirements};
use DoneDepConsole::notifications::Notice;
use DoneDepConsole::services::deploy_agent_chat::{
    self, DeployAgentChat, ANALYSIS_FAILED, ANALYSIS_INCOMPLETE, ANALYSIS_SUCCESS, API_KEY_CLEARED, API_KEY_SAVED,
    DEFAULT_SESSION, ERROR_REPLY,
};

#[tokio::test]
async fn initialize_stores_session_and_welcomes() {
    let transport = ScriptedTransport::new();
    transport.reply(
        Method::POST,
        "/deployagent/chat/init",
        StatusCode::OK,
        json!({ "success": true, "data": { "sessionId": "s-1", "message": "ready", "contextId": "c-1" } }),
    );
    let (client, _) = common::client(transport);
    let mut chat = DeployAgentChat::new();

    chat.initialize(&client).await;

    assert_eq!(chat.session_id(), Some("s-1"));
    assert_eq!(chat.context_id(), Some("c-1"));
    assert_eq!(chat.messages().len(), 1);
    assert!(chat.messages()[0].has_action("analyze"));
    assert!(chat.messages()[0].has_action("cicd"));
    assert!(chat.messages()[0].has_action("deploy"));
}

#[tokio::test]
async fn failed_initialize_leaves_chat_empty() {
    let (client, _) = common::client(ScriptedTransport::new());
    let mut chat = DeployAgentChat::new();

    chat.initialize(&client).await;

    assert_eq!(chat.session_id(), None);
    assert!(chat.messages().is_empty());
}

#[tokio::test]
async fn send_uses_default_session_and_keeps_context() {
    let transport = ScriptedTransport::new();
    transport.reply(
        Method::POST,
        "/deployagent/chat/message",
        StatusCode::OK,
        json!({
            "success": true,
            "data": {
                "message": "Here is a pipeline.",
                "actions": [{ "type": "terraform", "content": "Apply plan" }, {}],
                "sessionId": "default-session",
                "contextId": "c-9"
            }
        }),
    );
    let (client, _) = common::client(transport.clone());
    let mut chat = DeployAgentChat::new();

    chat.send(&client, "set up CI").await;

    let body = transport.requests()[0].body.clone().unwrap();
    assert_eq!(body["sessionId"], DEFAULT_SESSION);
    assert_eq!(chat.context_id(), Some("c-9"));

    let reply = chat.messages().last().unwrap();
    assert_eq!(reply.content, "Here is a pipeline.");
    assert!(reply.has_action("terraform"));
    assert!(reply.has_action("execute"));
}

#[tokio::test]
async fn action_sends_mapped_prompt() {
    let transport = ScriptedTransport::new();
    transport.reply(
        Method::POST,
        "/deployagent/chat/message",
        StatusCode::OK,
        json!({ "success": true, "data": { "message": "ok" } }),
    );
    let (client, _) = common::client(transport.clone());
    let mut chat = DeployAgentChat::new();

    chat.handle_action(&client, "cicd").await;

    assert_eq!(
        transport.requests()[0].body.as_ref().unwrap()["message"],
        "Help me set up a CI/CD pipeline for automated deployments."
    );
    assert_eq!(chat.messages().len(), 2);
}

#[tokio::test]
async fn unsuccessful_reply_becomes_error_message() {
    let transport = ScriptedTransport::new();
    transport.reply(
        Method::POST,
        "/deployagent/chat/message",
        StatusCode::OK,
        json!({ "success": false, "message": "agent offline" }),
    );
    let (client, _) = common::client(transport);
    let mut chat = DeployAgentChat::new();

    chat.send(&client, "deploy please").await;
    chat.send(&client, "  ").await;

    assert_eq!(chat.messages().len(), 2);
    assert_eq!(chat.messages()[1].content, ERROR_REPLY);
}

#[tokio::test]
async fn api_key_is_saved_and_cleared() {
    let (client, events) = common::client(ScriptedTransport::new());

    assert!(!deploy_agent_chat::save_api_key(&client, "   ").unwrap());
    assert!(!deploy_agent_chat::has_api_key(&client));

    assert!(deploy_agent_chat::save_api_key(&client, " sk-test ").unwrap());
    assert!(deploy_agent_chat::has_api_key(&client));
    assert_eq!(client.tokens().assistant_api_key().as_deref(), Some("sk-test"));

    deploy_agent_chat::clear_api_key(&client).unwrap();
    assert!(!deploy_agent_chat::has_api_key(&client));
    assert_eq!(
        events.drain(),
        vec![Notice::success(API_KEY_SAVED), Notice::success(API_KEY_CLEARED)]
    );
}

fn repository(framework: &str) -> DeploymentRepository {
    DeploymentRepository {
        url: "https://github.com/ada/shop".to_string(),
        branch: "main".to_string(),
        framework: framework.to_string(),
        language: "typescript".to_string(),
        package_manager: Some("npm".to_string()),
    }
}

#[tokio::test]
async fn stats_are_derived_from_knowledge_base() {
    let transport = ScriptedTransport::new();
    transport.reply(
        Method::GET,
        "/deployagent/knowledge/stats",
        StatusCode::OK,
        json!({ "success": true, "data": { "totalPatterns": 20, "totalExecutions": 90, "activeSessions": 4 } }),
    );
    let (client, _) = common::client(transport);

    let stats = deploy_agent_chat::load_deployment_stats(&client).await.unwrap();

    assert_eq!(stats.total_deployments, 20);
    assert_eq!(stats.successful_deployments, 19);
    assert_eq!(stats.active_projects, 4);
    assert_eq!(stats.average_deploy_time, "12m");
}

#[tokio::test]
async fn stats_failure_is_not_shown_as_a_notice() {
    let transport = ScriptedTransport::new();
    transport.reply(
        Method::GET,
        "/deployagent/knowledge/stats",
        StatusCode::BAD_REQUEST,
        json!({ "success": false, "message": "nope" }),
    );
    let (client, events) = common::client(transport);

    assert!(deploy_agent_chat::load_deployment_stats(&client).await.is_none());
    assert!(events.drain().is_empty());
}

#[tokio::test]
async fn incomplete_project_is_not_sent_for_analysis() {
    let transport = ScriptedTransport::new();
    let (client, events) = common::client(transport.clone());

    let result =
        deploy_agent_chat::analyze_project(&client, repository("  "), DeploymentRequirements::default()).await;

    assert!(result.is_err());
    assert!(transport.requests().is_empty());
    assert_eq!(events.drain(), vec![Notice::error(ANALYSIS_INCOMPLETE)]);
}

#[tokio::test]
async fn analysis_reports_success_and_failure() {
    let transport = ScriptedTransport::new();
    transport.reply(
        Method::POST,
        "/deployagent/analyze",
        StatusCode::OK,
        json!({ "success": true, "data": { "contextId": "c-9", "analysis": "Looks like a Next.js app" } }),
    );
    transport.reply(
        Method::POST,
        "/deployagent/analyze",
        StatusCode::BAD_REQUEST,
        json!({ "success": false, "message": "unsupported" }),
    );
    let (client, events) = common::client(transport.clone());

    let analysis = deploy_agent_chat::analyze_project(&client, repository("nextjs"), DeploymentRequirements::default())
        .await
        .unwrap();
    assert_eq!(analysis.context_id, "c-9");
    assert_eq!(transport.requests()[0].body.as_ref().unwrap()["repository"]["framework"], "nextjs");
    assert_eq!(events.drain(), vec![Notice::success(ANALYSIS_SUCCESS)]);

    let result =
        deploy_agent_chat::analyze_project(&client, repository("nextjs"), DeploymentRequirements::default()).await;
    assert!(result.is_err());
    assert_eq!(events.drain(), vec![Notice::error(ANALYSIS_FAILED)]);
}
