//! Hero Arena MCP Server
//!
//! A Model Context Protocol server using the official Rust SDK (rmcp)
//! that exposes the Hero Arena battle engine for LLM interaction. All
//! battles belong to a single local user.

use std::borrow::Cow;
use std::str::FromStr;
use std::sync::Arc;

use hero_arena::mcp_interface::*;
use hero_arena::{
    BattleId, BattleService, BattleSetup, EngineConfig, InMemoryArchive, RosterCatalog, RosterId,
    Side, UserId,
};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ErrorData as McpError, *},
    schemars, tool, tool_handler, tool_router, ServerHandler, ServiceExt,
};
use serde::Deserialize;
use tokio::io::{stdin, stdout};
use tracing::info;
use tracing_subscriber::EnvFilter;

const LOCAL_USER: &str = "local";

#[derive(Clone)]
pub struct HeroArenaService {
    tool_router: ToolRouter<HeroArenaService>,
    engine: Arc<BattleService>,
    catalog: Arc<RosterCatalog>,
    user: UserId,
}

// Tool request structures
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateBattleRequest {
    #[schemars(description = "Exactly three hero roster ids")]
    pub hero_ids: Vec<RosterId>,
    #[schemars(description = "Exactly three villain roster ids")]
    pub villain_ids: Vec<RosterId>,
    #[schemars(description = "Side that moves first: 'heroes' or 'villains'")]
    pub initiator: String,
    #[schemars(description = "Optional roster id of the hero that opens")]
    pub starting_hero: Option<RosterId>,
    #[schemars(description = "Optional roster id of the villain that opens")]
    pub starting_villain: Option<RosterId>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct BattleRequest {
    #[schemars(description = "Id of the battle")]
    pub battle_id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AttackRequest {
    #[schemars(description = "Id of the battle")]
    pub battle_id: String,
    #[schemars(description = "Attacking combatant id, e.g. 'H1'")]
    pub attacker: String,
    #[schemars(description = "Target combatant id, e.g. 'V2'")]
    pub target: String,
    #[schemars(description = "Attack kind: 'basic', 'special' or 'critical'")]
    pub kind: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SuperRequest {
    #[schemars(description = "Id of the battle")]
    pub battle_id: String,
    #[schemars(description = "Combatant id whose full bar is spent")]
    pub combatant: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AbilityRequest {
    #[schemars(description = "Id of the battle")]
    pub battle_id: String,
    #[schemars(description = "Combatant id using its ability")]
    pub combatant: String,
    #[schemars(description = "Optional target combatant id")]
    pub target: Option<String>,
}

impl CreateBattleRequest {
    fn into_setup(self) -> Result<BattleSetup, McpError> {
        let initiator = Side::from_str(self.initiator.trim()).map_err(|_| McpError {
            code: ErrorCode(-32602),
            message: Cow::from(format!("Unknown side '{}', use 'heroes' or 'villains'", self.initiator)),
            data: None,
        })?;
        Ok(BattleSetup::new(self.hero_ids, self.villain_ids, initiator)
            .with_starting(self.starting_hero, self.starting_villain))
    }
}

#[tool_router]
impl HeroArenaService {
    pub fn new(engine: BattleService, catalog: Arc<RosterCatalog>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            engine: Arc::new(engine),
            catalog,
            user: UserId::from(LOCAL_USER),
        }
    }

    #[tool(description = "List every hero and villain available for battle")]
    async fn list_roster(&self) -> Result<CallToolResult, McpError> {
        let text = display_roster(&self.catalog);
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(description = "Create a new 3v3 battle between heroes and villains")]
    async fn create_battle(
        &self,
        Parameters(request): Parameters<CreateBattleRequest>,
    ) -> Result<CallToolResult, McpError> {
        let setup = request.into_setup()?;
        let text = execute_create_battle(&self.engine, &setup, &self.user);
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(description = "Start a created battle")]
    async fn start_battle(
        &self,
        Parameters(request): Parameters<BattleRequest>,
    ) -> Result<CallToolResult, McpError> {
        let text = execute_start(&self.engine, &BattleId::from(request.battle_id), &self.user);
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(description = "Attack an opposing combatant with the side whose turn it is")]
    async fn attack(
        &self,
        Parameters(request): Parameters<AttackRequest>,
    ) -> Result<CallToolResult, McpError> {
        let text = execute_attack(
            &self.engine,
            &BattleId::from(request.battle_id),
            &self.user,
            &request.attacker,
            &request.target,
            &request.kind,
        );
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(description = "Spend a full power bar so the combatant's next attack deals double damage")]
    async fn activate_super_attack(
        &self,
        Parameters(request): Parameters<SuperRequest>,
    ) -> Result<CallToolResult, McpError> {
        let id = BattleId::from(request.battle_id);
        let text = execute_super(&self.engine, &id, &self.user, &request.combatant, false);
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(description = "Spend a full defense bar so the next hit on the combatant is halved")]
    async fn activate_super_defense(
        &self,
        Parameters(request): Parameters<SuperRequest>,
    ) -> Result<CallToolResult, McpError> {
        let id = BattleId::from(request.battle_id);
        let text = execute_super(&self.engine, &id, &self.user, &request.combatant, true);
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(description = "Use the combatant's special ability")]
    async fn use_ability(
        &self,
        Parameters(request): Parameters<AbilityRequest>,
    ) -> Result<CallToolResult, McpError> {
        let text = execute_ability(
            &self.engine,
            &BattleId::from(request.battle_id),
            &self.user,
            &request.combatant,
            request.target.as_deref(),
        );
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(description = "Get the current battle state")]
    async fn get_battle_state(
        &self,
        Parameters(request): Parameters<BattleRequest>,
    ) -> Result<CallToolResult, McpError> {
        let text = match self.engine.get_state(&BattleId::from(request.battle_id), &self.user) {
            Ok(summary) => display_battle_status(&summary),
            Err(e) => format!("Error: {}", e),
        };
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(description = "Show who can act and who can be targeted this turn")]
    async fn get_battle_details(
        &self,
        Parameters(request): Parameters<BattleRequest>,
    ) -> Result<CallToolResult, McpError> {
        let text = match self
            .engine
            .get_detailed_info(&BattleId::from(request.battle_id), &self.user)
        {
            Ok(details) => display_details(&details),
            Err(e) => format!("Error: {}", e),
        };
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(description = "Get the full battle snapshot as JSON")]
    async fn get_battle_json(
        &self,
        Parameters(request): Parameters<BattleRequest>,
    ) -> Result<CallToolResult, McpError> {
        let result = self.engine.get_state(&BattleId::from(request.battle_id), &self.user);
        let text = render_outcome(result, "battle state");
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(description = "List battles that are still in progress")]
    async fn list_active_battles(&self) -> Result<CallToolResult, McpError> {
        let text = render_outcome(Ok(self.engine.list_active(Some(&self.user))), "active battles");
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(description = "List finished battles, newest first")]
    async fn get_history(&self) -> Result<CallToolResult, McpError> {
        let text = match self.engine.get_history(Some(&self.user)) {
            Ok(history) => display_history(&history),
            Err(e) => format!("Error: {}", e),
        };
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(description = "Get win and monthly statistics over all finished battles")]
    async fn get_statistics(&self) -> Result<CallToolResult, McpError> {
        let text = match self.engine.get_statistics() {
            Ok(stats) => display_statistics(&stats),
            Err(e) => format!("Error: {}", e),
        };
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(description = "Create a battle and let it play out automatically")]
    async fn simulate_battle(
        &self,
        Parameters(request): Parameters<CreateBattleRequest>,
    ) -> Result<CallToolResult, McpError> {
        let setup = request.into_setup()?;
        let text = execute_simulation(&self.engine, &setup, &self.user);
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

#[tool_handler]
impl ServerHandler for HeroArenaService {}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr; stdout carries the MCP transport.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hero_arena=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = EngineConfig::from_env()?;
    let catalog = Arc::new(RosterCatalog::from_env()?);
    let engine = BattleService::new(catalog.clone(), Arc::new(InMemoryArchive::new()), config);
    let service = HeroArenaService::new(engine, catalog);
    let transport = (stdin(), stdout());

    info!("Hero Arena MCP server starting");
    let server = service.serve(transport).await?;

    let quit_reason = server.waiting().await?;
    info!(?quit_reason, "Hero Arena MCP server exiting");
    Ok(())
}
