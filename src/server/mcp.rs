use crate::app::dto::*;
use crate::app::engine::AnnotationEngine;
use crate::domain::reader::AnnotationResult;
use rmcp::{
    Json, ServerHandler, ServiceExt, handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters, model::*, tool, tool_handler, tool_router,
    transport::stdio,
};
use tokio::task::spawn_blocking;

#[derive(Clone)]
pub struct DirectiveMcpServer {
    engine: AnnotationEngine,
    tool_router: ToolRouter<Self>,
}

impl DirectiveMcpServer {
    pub fn new(engine: AnnotationEngine) -> Self {
        Self {
            engine,
            tool_router: Self::tool_router(),
        }
    }

    pub async fn serve_stdio(self) -> anyhow::Result<()> {
        let service = self.serve(stdio()).await?;
        service.waiting().await?;
        Ok(())
    }
}

#[tool_router]
impl DirectiveMcpServer {
    #[tool(
        description = "Read the directive tree (types, fields, functions with their definitions) of the loaded inspection."
    )]
    async fn read_annotations(
        &self,
        params: Parameters<ReadRequest>,
    ) -> Result<Json<AnnotationResult>, String> {
        let engine = self.engine.clone();
        let req = params.0;
        spawn_blocking(move || engine.read(req))
            .await
            .map_err(|e| format!("task join error: {e}"))?
            .map(Json)
            .map_err(|e| format!("{e:#}"))
    }

    #[tool(description = "Extract directive definitions and warnings from ad-hoc comment lines.")]
    async fn extract_directives(
        &self,
        params: Parameters<ExtractRequest>,
    ) -> Result<Json<ExtractResponse>, String> {
        let engine = self.engine.clone();
        let req = params.0;
        spawn_blocking(move || engine.extract(req))
            .await
            .map_err(|e| format!("task join error: {e}"))?
            .map(Json)
            .map_err(|e| format!("{e:#}"))
    }

    #[tool(description = "Validate an attribute map against a set of preconditions.")]
    async fn validate_attributes(
        &self,
        params: Parameters<ValidateRequest>,
    ) -> Result<Json<ValidateResponse>, String> {
        self.engine
            .validate(params.0)
            .map(Json)
            .map_err(|e| format!("{e:#}"))
    }

    #[tool(
        description = "Validate every definition with the given identifier across the inspection."
    )]
    async fn check_directives(
        &self,
        params: Parameters<CheckRequest>,
    ) -> Result<Json<CheckResponse>, String> {
        let engine = self.engine.clone();
        let req = params.0;
        spawn_blocking(move || engine.check(req))
            .await
            .map_err(|e| format!("task join error: {e}"))?
            .map(Json)
            .map_err(|e| format!("{e:#}"))
    }

    #[tool(description = "Find a type or function by name.")]
    async fn lookup_entity(
        &self,
        params: Parameters<LookupParams>,
    ) -> Result<Json<LookupResponse>, String> {
        Ok(Json(self.engine.lookup(&params.0.name)))
    }

    #[tool(description = "Generate http.Handle registrations from chariot.route directives.")]
    async fn generate_routes(&self) -> Result<Json<RoutesResponse>, String> {
        let engine = self.engine.clone();
        spawn_blocking(move || engine.routes())
            .await
            .map_err(|e| format!("task join error: {e}"))?
            .map(Json)
            .map_err(|e| format!("{e:#}"))
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, rmcp::schemars::JsonSchema)]
pub struct LookupParams {
    /// Type or function name, without package.
    pub name: String,
}

#[tool_handler]
impl ServerHandler for DirectiveMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Read, validate and generate code from structured directives in doc comments."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
