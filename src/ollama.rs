use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

/// Shared HTTP client for Ollama-compatible chat API calls.
pub struct OllamaClient {
    pub endpoint: String,
    pub model: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

/// Parameters for a chat request.
pub struct ChatRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub temperature: f32,
    pub top_p: f32,
    pub json_format: bool,
}

/// A tool call the model chose to make.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCall {
    pub function: ToolCallFunction,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallFunction {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

/// Assistant reply from a tool-bound chat call.
#[derive(Debug)]
pub struct ChatReply {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
    #[serde(default)]
    tool_calls: Vec<ToolCall>,
}

impl OllamaClient {
    pub fn new(endpoint: String, model: String) -> Self {
        Self {
            endpoint,
            model,
            api_key: None,
            client: reqwest::Client::new(),
        }
    }

    /// Attach a bearer token, for endpoints behind an auth gateway.
    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.api_key = Some(api_key);
        self
    }

    /// Send a chat request and return the response content.
    pub async fn chat(&self, request: ChatRequest) -> Result<String> {
        let body = self.build_body(&request, None);
        let message = self.post_chat(body).await?;
        Ok(message.content)
    }

    /// Send a chat request with a bound tool set. The model decides which
    /// tool (if any) to call; the reply carries its choices verbatim.
    pub async fn chat_with_tools(
        &self,
        request: ChatRequest,
        tools: &[Value],
    ) -> Result<ChatReply> {
        let body = self.build_body(&request, Some(tools));
        let message = self.post_chat(body).await?;
        Ok(ChatReply {
            content: message.content,
            tool_calls: message.tool_calls,
        })
    }

    fn build_body(&self, request: &ChatRequest, tools: Option<&[Value]>) -> Value {
        let mut body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": request.system_prompt },
                { "role": "user", "content": request.user_prompt }
            ],
            "stream": false,
            "options": {
                "temperature": request.temperature,
                "top_p": request.top_p
            }
        });

        if request.json_format {
            body["format"] = serde_json::json!("json");
        }

        if let Some(tools) = tools {
            body["tools"] = serde_json::json!(tools);
        }

        body
    }

    async fn post_chat(&self, body: Value) -> Result<ResponseMessage> {
        let mut request = self.client
            .post(format!("{}/api/chat", self.endpoint))
            .json(&body);

        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .context("Failed to send request to model endpoint")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Model API error ({}): {}", status, error_text);
        }

        let response_json: ChatResponse = response.json().await
            .context("Failed to parse model response")?;

        Ok(response_json.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_body_json_format() {
        let client = OllamaClient::new("http://localhost:11434".into(), "llama3.3:70b".into());
        let request = ChatRequest {
            system_prompt: "sys".into(),
            user_prompt: "user".into(),
            temperature: 0.2,
            top_p: 0.9,
            json_format: true,
        };

        let body = client.build_body(&request, None);
        assert_eq!(body["format"], "json");
        assert!(body.get("tools").is_none());
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "user");
    }

    #[test]
    fn test_build_body_with_tools_omits_format() {
        let client = OllamaClient::new("http://localhost:11434".into(), "mistral-small".into());
        let request = ChatRequest {
            system_prompt: "sys".into(),
            user_prompt: "user".into(),
            temperature: 0.2,
            top_p: 0.9,
            json_format: false,
        };
        let tools = vec![serde_json::json!({
            "type": "function",
            "function": { "name": "list_notes_tool" }
        })];

        let body = client.build_body(&request, Some(&tools));
        assert!(body.get("format").is_none());
        assert_eq!(body["tools"][0]["function"]["name"], "list_notes_tool");
    }

    #[test]
    fn test_parse_tool_call_reply() {
        let raw = r#"{
            "message": {
                "role": "assistant",
                "content": "",
                "tool_calls": [
                    {
                        "function": {
                            "name": "create_note_tool",
                            "arguments": { "title": "Groceries", "description": "milk and eggs" }
                        }
                    }
                ]
            }
        }"#;

        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.message.tool_calls.len(), 1);
        let call = &parsed.message.tool_calls[0];
        assert_eq!(call.function.name, "create_note_tool");
        assert_eq!(call.function.arguments["title"], "Groceries");
    }

    #[test]
    fn test_parse_plain_reply_defaults_tool_calls() {
        let raw = r#"{ "message": { "role": "assistant", "content": "hello" } }"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.message.content, "hello");
        assert!(parsed.message.tool_calls.is_empty());
    }

    #[tokio::test]
    async fn test_chat_against_mock_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/chat")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "model": "test-model",
                "stream": false
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{ "message": { "role": "assistant", "content": "pong" } }"#)
            .create_async()
            .await;

        let client = OllamaClient::new(server.url(), "test-model".into());
        let reply = client
            .chat(ChatRequest {
                system_prompt: "sys".into(),
                user_prompt: "ping".into(),
                temperature: 0.0,
                top_p: 1.0,
                json_format: false,
            })
            .await
            .unwrap();

        assert_eq!(reply, "pong");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_chat_surfaces_api_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/chat")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let client = OllamaClient::new(server.url(), "test-model".into());
        let result = client
            .chat(ChatRequest {
                system_prompt: "sys".into(),
                user_prompt: "ping".into(),
                temperature: 0.0,
                top_p: 1.0,
                json_format: false,
            })
            .await;

        let err = result.unwrap_err().to_string();
        assert!(err.contains("Model API error"), "unexpected error: {err}");
    }
}
