//! The scripted deployment walkthrough: six blocks on a board and an
//! assistant that moves them along as the user presses buttons.

use std::time::Duration;

use lazy_static::lazy_static;
use log::{debug, info, warn};
use regex::Regex;
use serde::Serialize;

use crate::models::agent::{AgentChatRequest, AgentDeploymentContext, AgentMessage, RepositoryRef};
use crate::models::conversation::{ActionButton, ConversationMessage};
use crate::models::deployment_block::{BlockKind, BlockStatus, DeploymentBlock, DeploymentBoard};
use crate::models::domain::SuggestionsRequest;
use crate::models::github::{ConnectData, Repository};
use crate::services::api_client::ApiClient;
use crate::services::{agent_service, domain_service, github_service};

pub const GREETING: &str = "Hi! I'm your DoneDep deployment assistant. Let's get your project deployed! First, let's connect your GitHub repositories.";
pub const AGENT_FALLBACK: &str = "I'm having trouble connecting to my AI brain right now, but I can still help you! Let me know what specific deployment step you'd like to work on.";
pub const SUGGESTIONS_FALLBACK: &str = "I couldn't look up domain suggestions right now. You can still pick one of the names I have ready.";

const SUGGESTION_KEYWORD: &str = "myapp";
const SUGGESTION_TLDS: [&str; 4] = ["com", "io", "dev", "app"];
const SUGGESTED_NAME: &str = "myawesomeapp";
const OFFERED_TLDS: [&str; 4] = ["com", "ai", "dev", "online"];
const DEMO_FRONTEND: &str = "React App (demo-frontend)";
const DEMO_BACKEND: &str = "Node.js API (demo-backend)";

lazy_static! {
    static ref DOMAIN_NAME: Regex =
        Regex::new(r"^(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,63}$").unwrap();
}

pub fn is_valid_domain(domain: &str) -> bool {
    domain.len() <= 253 && DOMAIN_NAME.is_match(domain)
}

/// Artificial pauses between a button press and the scripted outcome.
#[derive(Debug, Clone, Copy)]
pub struct ScriptTiming {
    pub think: Duration,
    pub github: Duration,
    pub database: Duration,
    pub domain: Duration,
    pub infrastructure: Duration,
}

impl Default for ScriptTiming {
    fn default() -> Self {
        ScriptTiming {
            think: Duration::from_millis(1500),
            github: Duration::from_millis(2000),
            database: Duration::from_millis(1500),
            domain: Duration::from_millis(2000),
            infrastructure: Duration::from_millis(3000),
        }
    }
}

impl ScriptTiming {
    pub fn instant() -> Self {
        ScriptTiming {
            think: Duration::ZERO,
            github: Duration::ZERO,
            database: Duration::ZERO,
            domain: Duration::ZERO,
            infrastructure: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseChoice {
    Postgres,
    Mongo,
    Both,
}

impl DatabaseChoice {
    fn details(self) -> &'static str {
        match self {
            DatabaseChoice::Postgres => "PostgreSQL",
            DatabaseChoice::Mongo => "MongoDB",
            DatabaseChoice::Both => "PostgreSQL + MongoDB",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuidedAction {
    ConnectGithub,
    AnalyzeProject,
    SetupDatabase,
    RegisterDomain,
    ConfirmDomain(String),
    SuggestDomain,
    RegisterTld(String),
    ChooseDatabase(DatabaseChoice),
    DeployInfrastructure,
    Unknown(String),
}

impl GuidedAction {
    /// Exact tags win over prefixed ones, so `register_domain` never reads
    /// as a TLD.
    pub fn parse(tag: &str) -> Self {
        match tag {
            "connect_github" => return GuidedAction::ConnectGithub,
            "analyze_project" => return GuidedAction::AnalyzeProject,
            "proceed_setup" | "setup_database" => return GuidedAction::SetupDatabase,
            "register_domain" => return GuidedAction::RegisterDomain,
            "setup_postgresql" => return GuidedAction::ChooseDatabase(DatabaseChoice::Postgres),
            "setup_mongodb" => return GuidedAction::ChooseDatabase(DatabaseChoice::Mongo),
            "setup_both_db" => return GuidedAction::ChooseDatabase(DatabaseChoice::Both),
            "deploy_infrastructure" => return GuidedAction::DeployInfrastructure,
            _ => {}
        }

        if let Some(domain) = tag.strip_prefix("confirm_domain_") {
            GuidedAction::ConfirmDomain(domain.to_string())
        } else if tag.starts_with("suggest_domain_") {
            GuidedAction::SuggestDomain
        } else if let Some(tld) = tag.strip_prefix("register_") {
            if OFFERED_TLDS.contains(&tld) {
                GuidedAction::RegisterTld(tld.to_string())
            } else {
                GuidedAction::Unknown(tag.to_string())
            }
        } else {
            GuidedAction::Unknown(tag.to_string())
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GuidedState<'a> {
    pub blocks: &'a [DeploymentBlock],
    pub messages: &'a [ConversationMessage],
}

pub struct GuidedDeployment {
    board: DeploymentBoard,
    messages: Vec<ConversationMessage>,
    timing: ScriptTiming,
    github_token: Option<String>,
}

impl GuidedDeployment {
    pub fn new(timing: ScriptTiming) -> Self {
        GuidedDeployment {
            board: DeploymentBoard::default(),
            messages: vec![ConversationMessage::assistant_with_actions(
                GREETING,
                vec![
                    ActionButton::primary("Connect GitHub", "connect_github"),
                    ActionButton::secondary("Skip for now", "skip_github"),
                ],
            )],
            timing,
            github_token: None,
        }
    }

    /// Makes `connect_github` call the real `/github/connect` endpoint.
    pub fn with_github_token(mut self, token: Option<String>) -> Self {
        self.github_token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn board(&self) -> &DeploymentBoard {
        &self.board
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub fn state(&self) -> GuidedState<'_> {
        GuidedState {
            blocks: self.board.blocks(),
            messages: &self.messages,
        }
    }

    pub async fn handle_action(&mut self, client: &ApiClient, tag: &str) {
        let action = GuidedAction::parse(tag);
        if let GuidedAction::Unknown(tag) = &action {
            info!("Ignoring unhandled deployment action {}", tag);
            return;
        }
        debug!("Handling deployment action {:?}", action);
        pause(self.timing.think).await;

        match action {
            GuidedAction::ConnectGithub => self.connect_github(client).await,
            GuidedAction::AnalyzeProject => self.analyze_project(),
            GuidedAction::SetupDatabase => self.setup_database().await,
            GuidedAction::RegisterDomain => self.register_domain(client).await,
            GuidedAction::ConfirmDomain(domain) => self.confirm_domain(&domain).await,
            GuidedAction::SuggestDomain => self.suggest_domain(),
            GuidedAction::RegisterTld(tld) => self.register_tld(&tld),
            GuidedAction::ChooseDatabase(choice) => self.choose_database(choice).await,
            GuidedAction::DeployInfrastructure => self.deploy_infrastructure().await,
            GuidedAction::Unknown(_) => {}
        }
    }

    /// Free-form question to the assistant. Blank input is ignored.
    pub async fn send_message(&mut self, client: &ApiClient, text: &str) {
        if text.trim().is_empty() {
            return;
        }

        let request = AgentChatRequest {
            message: text.to_string(),
            conversation_history: self.messages.iter().map(AgentMessage::from).collect(),
            deployment_context: Some(self.deployment_context()),
        };
        self.messages.push(ConversationMessage::user(text));

        let reply = match agent_service::chat(client, &request).await {
            Ok(response) if response.success => response.data,
            Ok(response) => {
                warn!(
                    "Agent chat was rejected: {}",
                    response.message.as_deref().unwrap_or("no message")
                );
                None
            }
            Err(e) => {
                warn!("Agent chat error: {}", e);
                None
            }
        };

        match reply {
            Some(data) => {
                let actions = data.actions.into_iter().map(ActionButton::from).collect();
                self.messages
                    .push(ConversationMessage::assistant_with_actions(data.response, actions));
            }
            None => self.say(
                AGENT_FALLBACK,
                vec![
                    ActionButton::primary("Connect GitHub", "connect_github"),
                    ActionButton::secondary("Register Domain", "register_domain"),
                    ActionButton::secondary("Setup Database", "setup_database"),
                ],
            ),
        }
    }

    pub fn deployment_context(&self) -> AgentDeploymentContext {
        let connected: Vec<_> = self.board.connected().collect();
        AgentDeploymentContext {
            project_type: Some("web-application".to_string()),
            technologies: connected.iter().map(|b| b.label().to_string()).collect(),
            repositories: connected
                .iter()
                .filter(|b| b.kind.is_repository())
                .map(|b| RepositoryRef {
                    kind: b.id.clone(),
                    name: b.details.clone(),
                })
                .collect(),
            domain: connected
                .iter()
                .find(|b| b.kind == BlockKind::Domain)
                .map(|b| b.label().to_string()),
            databases: connected
                .iter()
                .filter(|b| b.kind == BlockKind::Database)
                .map(|b| b.label().to_string())
                .collect(),
            deployment_tier: None,
        }
    }

    async fn connect_github(&mut self, client: &ApiClient) {
        let repos = [BlockKind::Frontend, BlockKind::Backend];
        self.board.set_status(&repos, BlockStatus::Connecting);
        self.say(
            "Great! I'm connecting to your GitHub account... I can see you have repositories. Let me analyze your project structure.",
            Vec::new(),
        );
        pause(self.timing.github).await;

        let (frontend, backend) = match self.github_token.clone() {
            None => (DEMO_FRONTEND.to_string(), DEMO_BACKEND.to_string()),
            Some(token) => match github_service::connect(client, &token).await {
                Ok(response) if response.success && response.data.is_some() => {
                    match response.data.as_ref().and_then(repository_labels) {
                        Some(labels) => labels,
                        None => {
                            self.github_failed("Your GitHub account has no repositories I can deploy yet.");
                            return;
                        }
                    }
                }
                Ok(response) => {
                    warn!("GitHub connection was rejected: {:?}", response.message);
                    self.github_failed("GitHub rejected the connection. Check the access token and try again.");
                    return;
                }
                Err(e) => {
                    warn!("GitHub connection failed: {}", e);
                    self.github_failed("I couldn't reach GitHub just now. Please try again.");
                    return;
                }
            },
        };

        info!("Repositories connected");
        self.board.connect(BlockKind::Frontend, frontend);
        self.board.connect(BlockKind::Backend, backend);
        self.say(
            "Perfect! I found your frontend and backend. Let's analyze your project structure and pick a deployment strategy, or go straight to choosing a name.",
            vec![
                ActionButton::primary("Analyze Project", "analyze_project"),
                ActionButton::secondary(SUGGESTED_NAME, "suggest_domain_1"),
            ],
        );
    }

    fn github_failed(&mut self, message: &str) {
        self.board
            .set_status(&[BlockKind::Frontend, BlockKind::Backend], BlockStatus::Failed);
        self.say(message, vec![ActionButton::primary("Try Again", "connect_github")]);
    }

    fn analyze_project(&mut self) {
        self.say(
            "Based on your React + Node.js stack, I recommend:\n\n\
             • **Frontend**: Deploy to Vercel or Netlify ($0-19/month)\n\
             • **Backend**: Deploy to Railway or Render ($5-25/month)\n\
             • **Database**: PostgreSQL on Supabase ($0-25/month)\n\
             • **Domain**: Custom domain with SSL ($10-15/year)\n\n\
             Estimated total cost: $15-69/month. Would you like me to proceed with this setup?",
            vec![
                ActionButton::primary("Proceed with Setup", "proceed_setup"),
                ActionButton::secondary("Choose Domain", "register_domain"),
            ],
        );
    }

    async fn setup_database(&mut self) {
        self.board.set_status(&[BlockKind::Database], BlockStatus::Connecting);
        pause(self.timing.database).await;

        self.board.connect(BlockKind::Database, "PostgreSQL (Supabase)");
        self.say(
            "Perfect! I've started setting up your database. Next, let's configure your domain and email services. What domain would you like to use?",
            vec![
                ActionButton::primary("Register New Domain", "register_domain"),
                ActionButton::secondary("Suggest a Name", "suggest_domain_1"),
            ],
        );
    }

    async fn register_domain(&mut self, client: &ApiClient) {
        let request = SuggestionsRequest {
            keyword: SUGGESTION_KEYWORD.to_string(),
            tlds: Some(SUGGESTION_TLDS.iter().map(|t| t.to_string()).collect()),
        };

        let suggestions = match domain_service::get_suggestions(client, &request).await {
            Ok(response) if response.success => response.data.map(|d| d.suggestions),
            Ok(response) => {
                warn!("Domain suggestions were rejected: {:?}", response.message);
                None
            }
            Err(e) => {
                warn!("Domain suggestions error: {}", e);
                None
            }
        };

        let available: Vec<_> = match suggestions {
            Some(suggestions) => suggestions.into_iter().filter(|s| s.available).take(5).collect(),
            None => {
                self.say(
                    SUGGESTIONS_FALLBACK,
                    vec![ActionButton::primary("Show Suggested Names", "suggest_domain_1")],
                );
                return;
            }
        };

        let first = match available.first() {
            Some(first) => first.domain.clone(),
            None => {
                self.say(
                    "None of those domains are available right now. Let me suggest some other names.",
                    vec![ActionButton::primary("Show Suggested Names", "suggest_domain_1")],
                );
                return;
            }
        };

        let listing = available
            .iter()
            .map(|s| format!("• **{}** - ${}/year", s.domain, s.price))
            .collect::<Vec<_>>()
            .join("\n");
        self.say(
            format!(
                "Great! I found some available domains for you:\n\n{}\n\nWhich domain would you like to register? I'll also set up SSL certificates and DNS automatically.",
                listing
            ),
            vec![
                ActionButton::primary(&format!("Register {}", first), &format!("confirm_domain_{}", first)),
                ActionButton::secondary("See More Options", "suggest_domain_1"),
            ],
        );
    }

    async fn confirm_domain(&mut self, domain: &str) {
        let domain = domain.trim().to_ascii_lowercase();
        if !is_valid_domain(&domain) {
            warn!("Refusing to register invalid domain {:?}", domain);
            self.say(
                format!("\"{}\" isn't a domain name I can register. Let's pick another one.", domain),
                vec![ActionButton::primary("Register New Domain", "register_domain")],
            );
            return;
        }

        self.board.set_status(&[BlockKind::Domain], BlockStatus::Connecting);
        pause(self.timing.domain).await;

        self.board.connect(BlockKind::Domain, domain.as_str());
        self.say(
            format!(
                "Excellent! I've registered {} and configured SSL certificates. Now let's set up your infrastructure.",
                domain
            ),
            vec![ActionButton::primary("Deploy Infrastructure", "deploy_infrastructure")],
        );
    }

    fn suggest_domain(&mut self) {
        self.board.set_status(&[BlockKind::Domain], BlockStatus::Connecting);
        self.board.rename(BlockKind::Domain, format!("{}.com", SUGGESTED_NAME));
        self.say(
            format!(
                "Checking availability for \"{name}\"... Here are your options:\n\n\
                 • {name}.com - $12/year (most popular)\n\
                 • {name}.ai - $45/year (tech-focused)\n\
                 • {name}.dev - $15/year (developer-friendly)\n\
                 • {name}.online - $8/year (budget option)\n\n\
                 Which one would you like?",
                name = SUGGESTED_NAME
            ),
            vec![
                ActionButton::primary(".com ($12/year)", "register_com"),
                ActionButton::secondary(".ai ($45/year)", "register_ai"),
                ActionButton::secondary(".dev ($15/year)", "register_dev"),
                ActionButton::secondary(".online ($8/year)", "register_online"),
            ],
        );
    }

    fn register_tld(&mut self, tld: &str) {
        let domain = format!("{}.{}", SUGGESTED_NAME, tld);
        self.board.rename(BlockKind::Domain, domain.as_str());
        self.board.connect(BlockKind::Domain, domain.as_str());
        self.say(
            format!(
                "Excellent! Registering {}...\n\n\
                 ✅ Domain registered\n\
                 ✅ DNS configured\n\
                 ✅ SSL certificate provisioned\n\n\
                 Now let's set up your database. What type of data will your app store?",
                domain
            ),
            vec![
                ActionButton::primary("User accounts & content", "setup_postgresql"),
                ActionButton::secondary("Simple data storage", "setup_mongodb"),
                ActionButton::secondary("I need both SQL + NoSQL", "setup_both_db"),
            ],
        );
    }

    async fn choose_database(&mut self, choice: DatabaseChoice) {
        self.board.set_status(&[BlockKind::Database], BlockStatus::Connecting);
        pause(self.timing.database).await;

        self.board.connect(BlockKind::Database, choice.details());
        self.say(
            format!(
                "Your {} database is provisioned and ready. Let's deploy your infrastructure.",
                choice.details()
            ),
            vec![ActionButton::primary("Deploy Infrastructure", "deploy_infrastructure")],
        );
    }

    async fn deploy_infrastructure(&mut self) {
        self.board
            .set_status(&[BlockKind::Cicd, BlockKind::Email], BlockStatus::Connecting);
        pause(self.timing.infrastructure).await;

        self.board.connect(BlockKind::Cicd, "GitHub Actions");
        self.board.connect(BlockKind::Email, "Transactional Email");

        let domain = self
            .board
            .get(BlockKind::Domain)
            .filter(|b| b.status == BlockStatus::Connected)
            .map(|b| b.label().to_string());
        let urls = match &domain {
            Some(domain) => format!(
                "• **Frontend**: https://{}\n• **Backend**: https://api.{}",
                domain, domain
            ),
            None => "• **Frontend**: preview URL (no domain connected)\n• **Backend**: preview URL".to_string(),
        };
        let database = self
            .board
            .get(BlockKind::Database)
            .filter(|b| b.status == BlockStatus::Connected)
            .map(|b| format!("{} (ready)", b.label()))
            .unwrap_or_else(|| "not configured".to_string());

        info!("Guided deployment completed for {}", domain.as_deref().unwrap_or("preview"));
        self.say(
            format!(
                "🎉 **Deployment Complete!**\n\nYour application is now live:\n{}\n\
                 • **Database**: {}\n\
                 • **CI/CD**: GitHub Actions configured\n\
                 • **Email**: Transactional email ready\n\n\
                 Your app is production-ready with automatic scaling, SSL, and monitoring!",
                urls, database
            ),
            vec![
                ActionButton::primary("View Live App", "view_app"),
                ActionButton::secondary("Setup Monitoring", "setup_monitoring"),
            ],
        );
    }

    fn say(&mut self, content: impl Into<String>, actions: Vec<ActionButton>) {
        self.messages
            .push(ConversationMessage::assistant_with_actions(content, actions));
    }
}

/// Labels for the frontend and backend blocks from the first two
/// repositories on the account.
fn repository_labels(data: &ConnectData) -> Option<(String, String)> {
    let label = |repo: &Repository| match &repo.language {
        Some(language) => format!("{} ({})", repo.full_name, language),
        None => repo.full_name.clone(),
    };
    let first = data.repositories.first()?;
    let second = data.repositories.get(1).unwrap_or(first);
    Some((label(first), label(second)))
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_tags_take_precedence_over_prefixes() {
        assert_eq!(GuidedAction::parse("register_domain"), GuidedAction::RegisterDomain);
        assert_eq!(GuidedAction::parse("register_dev"), GuidedAction::RegisterTld("dev".to_string()));
        assert_eq!(GuidedAction::parse("proceed_setup"), GuidedAction::SetupDatabase);
        assert_eq!(GuidedAction::parse("setup_database"), GuidedAction::SetupDatabase);
        assert_eq!(
            GuidedAction::parse("confirm_domain_myapp.io"),
            GuidedAction::ConfirmDomain("myapp.io".to_string())
        );
        assert_eq!(GuidedAction::parse("suggest_domain_7"), GuidedAction::SuggestDomain);
    }

    #[test]
    fn unsupported_tags_are_unknown() {
        assert_eq!(
            GuidedAction::parse("register_xyz"),
            GuidedAction::Unknown("register_xyz".to_string())
        );
        assert_eq!(
            GuidedAction::parse("skip_github"),
            GuidedAction::Unknown("skip_github".to_string())
        );
    }

    #[test]
    fn domain_names_are_validated() {
        assert!(is_valid_domain("myapp.io"));
        assert!(is_valid_domain("my-app.co.uk"));
        assert!(!is_valid_domain("myapp"));
        assert!(!is_valid_domain("-bad.com"));
        assert!(!is_valid_domain("bad domain.com"));
        assert!(!is_valid_domain("../etc/passwd"));
    }

    #[test]
    fn new_walkthrough_greets_with_github_choice() {
        let guided = GuidedDeployment::new(ScriptTiming::instant());
        assert_eq!(guided.messages().len(), 1);
        assert!(guided.messages()[0].has_action("connect_github"));
        assert!(guided.messages()[0].has_action("skip_github"));
        assert!(guided
            .board()
            .blocks()
            .iter()
            .all(|b| b.status == BlockStatus::Pending));
    }

    #[test]
    fn context_reflects_connected_blocks() {
        let mut guided = GuidedDeployment::new(ScriptTiming::instant());
        guided.board.connect(BlockKind::Frontend, DEMO_FRONTEND);
        guided.board.connect(BlockKind::Domain, "myapp.io");

        let context = guided.deployment_context();
        assert_eq!(context.technologies, vec![DEMO_FRONTEND.to_string(), "myapp.io".to_string()]);
        assert_eq!(context.repositories.len(), 1);
        assert_eq!(context.repositories[0].kind, "frontend");
        assert_eq!(context.domain.as_deref(), Some("myapp.io"));
    }
}
