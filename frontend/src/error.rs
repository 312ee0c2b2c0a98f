use serde_json::Value;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

/// 单次后端调用的失败
///
/// 视图不做重试，变体只决定向用户展示的文案。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// 请求未得到任何响应
    #[error("network error: {0}")]
    Network(String),
    /// 401/403: the session token was rejected.
    #[error("unauthorized ({status})")]
    Unauthorized { status: u16, message: Option<String> },
    /// 其他非 2xx 状态
    #[error("request failed with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("could not decode response: {0}")]
    Decode(String),
    #[error("could not encode request: {0}")]
    Encode(String),
}

impl ApiError {
    /// 映射非成功响应，后端提供 `message` 时予以保留
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = extract_message(body);
        match status {
            401 | 403 => ApiError::Unauthorized { status, message },
            _ => ApiError::Status {
                status,
                message: message.unwrap_or_else(|| generic_message(status).to_string()),
            },
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    /// 用于提示框或内联错误的文案
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) => "Não foi possível conectar ao servidor.".to_string(),
            ApiError::Unauthorized { message, .. } => message
                .clone()
                .unwrap_or_else(|| "Sessão expirada. Entre novamente.".to_string()),
            ApiError::Status { message, .. } => message.clone(),
            ApiError::Decode(_) | ApiError::Encode(_) => {
                "Resposta inesperada do servidor.".to_string()
            }
        }
    }
}

/// 从错误响应体中提取 `message`
///
/// 后端返回 `{"message": "..."}`，校验错误时返回 `{"message": ["...", ...]}`，取第一条。
pub fn extract_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("message")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => items
            .iter()
            .find_map(|item| item.as_str())
            .map(str::to_string),
        _ => None,
    }
}

fn generic_message(status: u16) -> &'static str {
    match status {
        400 => "Dados inválidos.",
        404 => "Não encontrado.",
        409 => "Registro já existe.",
        500..=599 => "Erro no servidor. Tente novamente mais tarde.",
        _ => "Não foi possível concluir a operação.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_message_is_preferred() {
        let err = ApiError::from_status(400, r#"{"message":"Nome já em uso","statusCode":400}"#);
        assert_eq!(
            err,
            ApiError::Status {
                status: 400,
                message: "Nome já em uso".into()
            }
        );
        assert_eq!(err.user_message(), "Nome já em uso");
    }

    #[test]
    fn validation_arrays_use_first_entry() {
        let body = r#"{"message":["email must be an email","senha too short"],"error":"Bad Request"}"#;
        assert_eq!(extract_message(body).as_deref(), Some("email must be an email"));
    }

    #[test]
    fn falls_back_to_generic_text() {
        let err = ApiError::from_status(502, "<html>Bad gateway</html>");
        assert_eq!(err.user_message(), "Erro no servidor. Tente novamente mais tarde.");
        assert_eq!(extract_message(r#"{"message":"  "}"#), None);
    }

    #[test]
    fn auth_statuses_are_unauthorized() {
        assert!(ApiError::from_status(401, "").is_unauthorized());
        assert!(ApiError::from_status(403, r#"{"message":"Forbidden"}"#).is_unauthorized());
        assert!(!ApiError::from_status(404, "").is_unauthorized());
        assert_eq!(
            ApiError::from_status(401, "").user_message(),
            "Sessão expirada. Entre novamente."
        );
    }
}
