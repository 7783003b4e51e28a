//! JWT 토큰 처리.
//!
//! Access Token 및 Refresh Token 생성/검증 로직.
//!
//! 서명 키는 기동 시 한 번 로드되는 대칭 키(HS256)이며, 이후 변경되지
//! 않으므로 요청 간 동기화 없이 안전하게 공유됩니다.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Principal, Role};

/// Refresh Token의 token_type 고정값.
const REFRESH_TOKEN_TYPE: &str = "refresh";

/// JWT 서명/만료 설정.
///
/// 기동 시 한 번 생성되어 Arc로 공유되는 불변 설정입니다.
#[derive(Debug, Clone)]
pub struct JwtSettings {
    /// HS256 대칭 서명 키
    pub secret: String,
    /// Access Token 만료 시간 (분)
    pub access_expires_minutes: i64,
    /// Refresh Token 만료 시간 (일)
    pub refresh_expires_days: i64,
}

impl JwtSettings {
    /// 환경 변수에서 설정 로드.
    ///
    /// # 환경변수
    /// - `JWT_SECRET`: 서명 키 (미설정 시 개발용 기본값 + 경고)
    /// - `JWT_ACCESS_EXPIRES_MINUTES`: 기본 30분
    /// - `JWT_REFRESH_EXPIRES_DAYS`: 기본 14일
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set, using default (INSECURE for development only)");
            "dev-secret-key-change-in-production".to_string()
        });

        let access_expires_minutes = std::env::var("JWT_ACCESS_EXPIRES_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        let refresh_expires_days = std::env::var("JWT_REFRESH_EXPIRES_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(14);

        Self {
            secret,
            access_expires_minutes,
            refresh_expires_days,
        }
    }
}

/// JWT Access Token 페이로드.
///
/// 사용자 인증 정보와 권한을 포함합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - 사용자 PK
    pub sub: String,
    /// 닉네임
    pub nickname: String,
    /// 사용자 역할
    pub role: Role,
    /// Issued At - 토큰 발급 시간 (Unix timestamp)
    pub iat: i64,
    /// Expiration - 토큰 만료 시간 (Unix timestamp)
    pub exp: i64,
    /// JWT ID - 토큰 고유 식별자
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

impl Claims {
    /// 새로운 Claims 생성.
    ///
    /// # Arguments
    ///
    /// * `user_pk` - 사용자 PK
    /// * `nickname` - 닉네임
    /// * `role` - 사용자 역할
    /// * `expires_in_minutes` - 만료 시간 (분)
    pub fn new(user_pk: Uuid, nickname: impl Into<String>, role: Role, expires_in_minutes: i64) -> Self {
        let now = Utc::now();
        Self {
            sub: user_pk.to_string(),
            nickname: nickname.into(),
            role,
            iat: now.timestamp(),
            exp: (now + Duration::minutes(expires_in_minutes)).timestamp(),
            jti: Some(Uuid::new_v4().to_string()),
        }
    }

    /// 토큰이 만료되었는지 확인.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// Claims로부터 Principal 재구성.
    ///
    /// sub가 유효한 UUID가 아니면 `JwtError::InvalidToken`을 반환합니다.
    pub fn to_principal(&self) -> Result<Principal, JwtError> {
        let pk = Uuid::parse_str(&self.sub).map_err(|_| JwtError::InvalidToken)?;
        Ok(Principal::User {
            pk,
            nickname: self.nickname.clone(),
            role: self.role,
        })
    }
}

/// Refresh Token 페이로드.
///
/// Access Token 갱신에만 사용됩니다. 역할/닉네임을 담지 않아
/// Access Token 검증 경로에서는 절대 통과할 수 없습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Subject - 사용자 PK
    pub sub: String,
    /// Issued At
    pub iat: i64,
    /// Expiration
    pub exp: i64,
    /// JWT ID
    pub jti: String,
    /// Token type (항상 "refresh")
    pub token_type: String,
}

impl RefreshClaims {
    /// 새로운 Refresh Claims 생성.
    ///
    /// # Arguments
    ///
    /// * `user_pk` - 사용자 PK
    /// * `expires_in_days` - 만료 시간 (일)
    pub fn new(user_pk: Uuid, expires_in_days: i64) -> Self {
        let now = Utc::now();
        Self {
            sub: user_pk.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::days(expires_in_days)).timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type: REFRESH_TOKEN_TYPE.to_string(),
        }
    }
}

/// Access Token + Refresh Token 페어.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Access Token
    pub access_token: String,
    /// Refresh Token
    pub refresh_token: String,
    /// Access Token 만료 시간 (초)
    pub expires_in: i64,
    /// 토큰 타입 (항상 "Bearer")
    pub token_type: String,
}

/// JWT 토큰 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("토큰 인코딩 실패: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),
    #[error("토큰 디코딩 실패")]
    DecodingError,
    #[error("토큰이 만료되었습니다")]
    TokenExpired,
    #[error("유효하지 않은 토큰")]
    InvalidToken,
}

/// Access Token 생성.
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(JwtError::from)
}

/// Refresh Token 생성.
pub fn create_refresh_token(claims: &RefreshClaims, secret: &str) -> Result<String, JwtError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(JwtError::from)
}

/// Access Token + Refresh Token 쌍 생성.
///
/// # Arguments
///
/// * `user_pk` - 사용자 PK
/// * `nickname` - 닉네임
/// * `role` - 사용자 역할
/// * `settings` - JWT 서명/만료 설정
pub fn create_token_pair(
    user_pk: Uuid,
    nickname: &str,
    role: Role,
    settings: &JwtSettings,
) -> Result<TokenPair, JwtError> {
    let access_claims = Claims::new(user_pk, nickname, role, settings.access_expires_minutes);
    let refresh_claims = RefreshClaims::new(user_pk, settings.refresh_expires_days);

    let access_token = create_token(&access_claims, &settings.secret)?;
    let refresh_token = create_refresh_token(&refresh_claims, &settings.secret)?;

    Ok(TokenPair {
        access_token,
        refresh_token,
        expires_in: settings.access_expires_minutes * 60,
        token_type: "Bearer".to_string(),
    })
}

/// Access Token 디코딩 및 검증.
///
/// 서명과 만료를 검증하고 Claims를 반환합니다. Refresh Token은
/// 필수 필드(nickname, role)가 없어 이 경로에서 항상 실패합니다.
pub fn decode_token(token: &str, secret: &str) -> Result<TokenData<Claims>, JwtError> {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
        jsonwebtoken::errors::ErrorKind::InvalidToken
        | jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidToken,
        _ => JwtError::DecodingError,
    })
}

/// Refresh Token 디코딩 및 검증.
///
/// 서명/만료 외에 `token_type == "refresh"`를 추가로 확인하여
/// Access Token이 재발급 경로로 들어오는 것을 차단합니다.
pub fn decode_refresh_token(
    token: &str,
    secret: &str,
) -> Result<TokenData<RefreshClaims>, JwtError> {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    let data = decode::<RefreshClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
        jsonwebtoken::errors::ErrorKind::InvalidToken
        | jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidToken,
        _ => JwtError::DecodingError,
    })?;

    if data.claims.token_type != REFRESH_TOKEN_TYPE {
        return Err(JwtError::InvalidToken);
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_settings() -> JwtSettings {
        JwtSettings {
            secret: "test-secret-key-for-jwt-testing-minimum-32-chars".to_string(),
            access_expires_minutes: 30,
            refresh_expires_days: 14,
        }
    }

    #[test]
    fn test_create_and_decode_token() {
        let settings = test_settings();
        let pk = Uuid::new_v4();
        let claims = Claims::new(pk, "길잡이유저", Role::User, 60);

        let token = create_token(&claims, &settings.secret).unwrap();
        assert!(!token.is_empty());

        let decoded = decode_token(&token, &settings.secret).unwrap();
        assert_eq!(decoded.claims.sub, pk.to_string());
        assert_eq!(decoded.claims.nickname, "길잡이유저");
        assert_eq!(decoded.claims.role, Role::User);
    }

    #[test]
    fn test_decode_returns_same_principal() {
        let settings = test_settings();
        let pk = Uuid::new_v4();
        let pair = create_token_pair(pk, "테스터", Role::Admin, &settings).unwrap();

        let decoded = decode_token(&pair.access_token, &settings.secret).unwrap();
        let principal = decoded.claims.to_principal().unwrap();

        assert_eq!(
            principal,
            Principal::User {
                pk,
                nickname: "테스터".to_string(),
                role: Role::Admin,
            }
        );
    }

    #[test]
    fn test_create_token_pair() {
        let settings = test_settings();
        let pk = Uuid::new_v4();
        let pair = create_token_pair(pk, "testuser", Role::Admin, &settings).unwrap();

        assert!(!pair.access_token.is_empty());
        assert!(!pair.refresh_token.is_empty());
        assert_eq!(pair.token_type, "Bearer");
        assert_eq!(pair.expires_in, 30 * 60);

        // Access token 검증
        let access = decode_token(&pair.access_token, &settings.secret).unwrap();
        assert_eq!(access.claims.sub, pk.to_string());
        assert_eq!(access.claims.role, Role::Admin);

        // Refresh token 검증
        let refresh = decode_refresh_token(&pair.refresh_token, &settings.secret).unwrap();
        assert_eq!(refresh.claims.sub, pk.to_string());
        assert_eq!(refresh.claims.token_type, "refresh");
    }

    #[test]
    fn test_tokens_are_not_interchangeable() {
        let settings = test_settings();
        let pair = create_token_pair(Uuid::new_v4(), "user", Role::User, &settings).unwrap();

        // Refresh Token은 Access 검증 경로에서 실패해야 함
        let result = decode_token(&pair.refresh_token, &settings.secret);
        assert!(result.is_err());

        // Access Token은 Refresh 검증 경로에서 실패해야 함
        let result = decode_refresh_token(&pair.access_token, &settings.secret);
        assert!(result.is_err());
    }

    #[test]
    fn test_expired_token() {
        let settings = test_settings();
        // 만료 시각을 5분 전으로 설정 (기본 leeway 60초를 넘김)
        let claims = Claims::new(Uuid::new_v4(), "user", Role::User, -5);
        let token = create_token(&claims, &settings.secret).unwrap();

        let result = decode_token(&token, &settings.secret);
        assert!(matches!(result, Err(JwtError::TokenExpired)));
    }

    #[test]
    fn test_wrong_secret() {
        let settings = test_settings();
        let claims = Claims::new(Uuid::new_v4(), "user", Role::User, 60);
        let token = create_token(&claims, &settings.secret).unwrap();

        let result = decode_token(&token, "wrong-secret-key-for-testing-minimum-32-chars");
        assert!(result.is_err());
    }

    #[test]
    fn test_tampered_refresh_token() {
        let settings = test_settings();
        let pair = create_token_pair(Uuid::new_v4(), "user", Role::User, &settings).unwrap();

        // 서명 일부를 변조
        let mut tampered = pair.refresh_token.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'a' { 'b' } else { 'a' });

        let result = decode_refresh_token(&tampered, &settings.secret);
        assert!(result.is_err());
    }

    #[test]
    fn test_expired_refresh_token() {
        let settings = test_settings();
        let mut claims = RefreshClaims::new(Uuid::new_v4(), 14);
        claims.exp = (Utc::now() - Duration::minutes(5)).timestamp();
        let token = create_refresh_token(&claims, &settings.secret).unwrap();

        let result = decode_refresh_token(&token, &settings.secret);
        assert!(matches!(result, Err(JwtError::TokenExpired)));
    }

    #[test]
    fn test_reissue_flow_with_expired_access_token() {
        let settings = test_settings();
        let pk = Uuid::new_v4();

        // 만료된 액세스 토큰 + 유효한 리프레시 토큰
        let expired_claims = Claims::new(pk, "유저", Role::User, -5);
        let expired_access = create_token(&expired_claims, &settings.secret).unwrap();
        let refresh_claims = RefreshClaims::new(pk, settings.refresh_expires_days);
        let refresh = create_refresh_token(&refresh_claims, &settings.secret).unwrap();

        // 리프레시 토큰 검증 후 같은 주체로 새 액세스 토큰 발급
        let data = decode_refresh_token(&refresh, &settings.secret).unwrap();
        assert_eq!(data.claims.sub, pk.to_string());

        let new_claims = Claims::new(pk, "유저", Role::User, settings.access_expires_minutes);
        let new_access = create_token(&new_claims, &settings.secret).unwrap();

        let decoded = decode_token(&new_access, &settings.secret).unwrap();
        assert_eq!(decoded.claims.sub, pk.to_string());

        // 기존 액세스 토큰은 여전히 거부됨
        assert!(matches!(
            decode_token(&expired_access, &settings.secret),
            Err(JwtError::TokenExpired)
        ));
    }

    #[test]
    fn test_invalid_token_format() {
        let result = decode_token("invalid.token.here", "any-secret");
        assert!(result.is_err());
    }

    #[test]
    fn test_claims_is_expired() {
        let live = Claims::new(Uuid::new_v4(), "user", Role::User, 60);
        assert!(!live.is_expired());

        let dead = Claims::new(Uuid::new_v4(), "user", Role::User, -5);
        assert!(dead.is_expired());
    }
}
