//! 경로 기반 인가 정책.
//!
//! (HTTP 메서드, 경로 패턴, 요구 권한) 레코드의 순서 있는 목록으로,
//! 기동 시 한 번 구성되어 이후 변경되지 않습니다. 요청마다 첫 번째로
//! 일치하는 규칙이 적용됩니다 (첫 일치 우선). 구체적인 패턴을 넓은
//! 패턴보다 먼저 등록해야 합니다.
//!
//! 패턴 문법:
//! - `*`  : 경로 세그먼트 하나와 일치
//! - `**` : 남은 모든 세그먼트와 일치 (마지막 위치에서만 사용)

use axum::http::Method;

use super::{Principal, Role};

/// 경로 패턴.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// 고정 문자열 세그먼트
    Literal(String),
    /// 세그먼트 하나 (`*`)
    Wildcard,
    /// 남은 전체 (`**`)
    DeepWildcard,
}

impl PathPattern {
    /// 패턴 문자열 파싱.
    pub fn parse(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| match s {
                "*" => Segment::Wildcard,
                "**" => Segment::DeepWildcard,
                literal => Segment::Literal(literal.to_string()),
            })
            .collect();

        Self { segments }
    }

    /// 요청 경로와 일치 여부 확인.
    pub fn matches(&self, path: &str) -> bool {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let mut i = 0;
        for segment in &self.segments {
            match segment {
                // `**`는 남은 세그먼트 전체(0개 포함)와 일치
                Segment::DeepWildcard => return true,
                Segment::Wildcard => {
                    if i >= parts.len() {
                        return false;
                    }
                    i += 1;
                }
                Segment::Literal(expected) => {
                    if i >= parts.len() || parts[i] != expected {
                        return false;
                    }
                    i += 1;
                }
            }
        }

        i == parts.len()
    }
}

/// 접근 요구 조건.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// 인증 없이 접근 허용
    PermitAll,
    /// 역할 무관 인증 필요
    Authenticated,
    /// 특정 역할 이상 필요
    HasRole(Role),
}

/// 인가 규칙 하나.
#[derive(Debug, Clone)]
pub struct RouteRule {
    /// 적용 메서드 (None이면 모든 메서드)
    pub method: Option<Method>,
    /// 경로 패턴
    pub pattern: PathPattern,
    /// 요구 조건
    pub access: Access,
}

/// 인가 평가 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// 접근 허용
    Permit,
    /// 인증 필요 (401)
    RequireAuth,
    /// 권한 부족 (403)
    Forbidden,
}

/// 인가 정책 테이블.
///
/// 규칙은 등록 순서대로 평가되며 첫 번째 일치가 승리합니다.
/// 어떤 규칙과도 일치하지 않는 요청은 "역할 무관 인증 필요"로 처리됩니다.
#[derive(Debug, Clone, Default)]
pub struct SecurityPolicy {
    rules: Vec<RouteRule>,
}

impl SecurityPolicy {
    /// 빈 정책 생성.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// 모든 메서드에 대해 인증 없이 허용.
    pub fn permit_all(mut self, pattern: &str) -> Self {
        self.rules.push(RouteRule {
            method: None,
            pattern: PathPattern::parse(pattern),
            access: Access::PermitAll,
        });
        self
    }

    /// 특정 메서드에 대해 인증 없이 허용.
    pub fn permit(mut self, method: Method, pattern: &str) -> Self {
        self.rules.push(RouteRule {
            method: Some(method),
            pattern: PathPattern::parse(pattern),
            access: Access::PermitAll,
        });
        self
    }

    /// 특정 역할 이상 요구.
    pub fn require_role(mut self, pattern: &str, role: Role) -> Self {
        self.rules.push(RouteRule {
            method: None,
            pattern: PathPattern::parse(pattern),
            access: Access::HasRole(role),
        });
        self
    }

    /// 역할 무관 인증 요구.
    pub fn require_authenticated(mut self, pattern: &str) -> Self {
        self.rules.push(RouteRule {
            method: None,
            pattern: PathPattern::parse(pattern),
            access: Access::Authenticated,
        });
        self
    }

    /// 등록된 규칙 수.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// 규칙이 없는지 확인.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// 요청에 대한 인가 평가 (순수 함수).
    ///
    /// 첫 번째로 일치하는 규칙의 요구 조건을 Principal과 대조합니다.
    pub fn decide(&self, method: &Method, path: &str, principal: &Principal) -> Decision {
        let access = self
            .rules
            .iter()
            .find(|rule| {
                rule.method.as_ref().map(|m| m == method).unwrap_or(true)
                    && rule.pattern.matches(path)
            })
            .map(|rule| &rule.access)
            // 일치하는 규칙이 없으면 기본값: 인증 필요
            .unwrap_or(&Access::Authenticated);

        match access {
            Access::PermitAll => Decision::Permit,
            Access::Authenticated => {
                if principal.is_anonymous() {
                    Decision::RequireAuth
                } else {
                    Decision::Permit
                }
            }
            Access::HasRole(role) => {
                if principal.is_anonymous() {
                    Decision::RequireAuth
                } else if principal.has_role(*role) {
                    Decision::Permit
                } else {
                    Decision::Forbidden
                }
            }
        }
    }
}

/// 기본 인가 정책 구성.
///
/// 화이트리스트(로그인/토큰/공개 조회)와 관리자 경로를 등록합니다.
/// 등록되지 않은 나머지 경로는 모두 인증이 필요합니다.
pub fn default_policy() -> SecurityPolicy {
    SecurityPolicy::new()
        // 헬스 체크
        .permit_all("/health")
        .permit_all("/health/**")
        // 로그인/토큰
        .permit_all("/api/login/**")
        .permit_all("/api/v1/token/validate")
        .permit_all("/api/v1/token/reissue")
        .permit(Method::GET, "/api/auth/kakao/login-url")
        .permit(Method::GET, "/api/auth/naver/login-url")
        // 공개 조회
        .permit(Method::GET, "/api/v1/users/nickname/*/exists")
        .permit(Method::GET, "/api/v1/boards/popular")
        .permit(Method::GET, "/api/v1/boards")
        .permit(Method::GET, "/api/v1/boards/*")
        .permit(Method::GET, "/api/v1/boards/*/comments")
        .permit(Method::GET, "/api/v1/categories/root")
        .permit(Method::GET, "/api/v1/categories/*/children")
        .permit(Method::GET, "/api/v1/categories/*/ancestor")
        // 관리자 전용
        .require_role("/api/v1/admin/**", Role::Admin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user_principal(role: Role) -> Principal {
        Principal::User {
            pk: Uuid::new_v4(),
            nickname: "tester".to_string(),
            role,
        }
    }

    #[test]
    fn test_path_pattern_literal() {
        let pattern = PathPattern::parse("/api/v1/boards");
        assert!(pattern.matches("/api/v1/boards"));
        assert!(!pattern.matches("/api/v1/boards/123"));
        assert!(!pattern.matches("/api/v1"));
    }

    #[test]
    fn test_path_pattern_wildcard() {
        let pattern = PathPattern::parse("/api/v1/boards/*");
        assert!(pattern.matches("/api/v1/boards/123"));
        assert!(!pattern.matches("/api/v1/boards"));
        assert!(!pattern.matches("/api/v1/boards/123/comments"));

        let nested = PathPattern::parse("/api/v1/boards/*/comments");
        assert!(nested.matches("/api/v1/boards/123/comments"));
        assert!(!nested.matches("/api/v1/boards/123"));
    }

    #[test]
    fn test_path_pattern_deep_wildcard() {
        let pattern = PathPattern::parse("/api/v1/admin/**");
        assert!(pattern.matches("/api/v1/admin"));
        assert!(pattern.matches("/api/v1/admin/reports"));
        assert!(pattern.matches("/api/v1/admin/boards/123/status"));
        assert!(!pattern.matches("/api/v1/boards"));
    }

    #[test]
    fn test_first_match_wins() {
        // 구체적인 permit 규칙이 넓은 역할 규칙보다 먼저 등록됨
        let policy = SecurityPolicy::new()
            .permit(Method::GET, "/api/v1/admin/public-stats")
            .require_role("/api/v1/admin/**", Role::Admin);

        let anonymous = Principal::Anonymous;

        // 먼저 등록된 permit이 우선
        assert_eq!(
            policy.decide(&Method::GET, "/api/v1/admin/public-stats", &anonymous),
            Decision::Permit
        );
        // 다른 admin 경로는 여전히 보호됨
        assert_eq!(
            policy.decide(&Method::GET, "/api/v1/admin/reports", &anonymous),
            Decision::RequireAuth
        );
    }

    #[test]
    fn test_permit_all_without_token() {
        let policy = default_policy();
        let anonymous = Principal::Anonymous;

        assert_eq!(
            policy.decide(&Method::GET, "/api/v1/boards/popular", &anonymous),
            Decision::Permit
        );
        assert_eq!(
            policy.decide(&Method::POST, "/api/login/kakao", &anonymous),
            Decision::Permit
        );
        assert_eq!(
            policy.decide(&Method::GET, "/health", &anonymous),
            Decision::Permit
        );
    }

    #[test]
    fn test_method_scoped_permit() {
        let policy = default_policy();
        let anonymous = Principal::Anonymous;

        // GET은 공개, POST는 인증 필요
        assert_eq!(
            policy.decide(&Method::GET, "/api/v1/boards", &anonymous),
            Decision::Permit
        );
        assert_eq!(
            policy.decide(&Method::POST, "/api/v1/boards", &anonymous),
            Decision::RequireAuth
        );
    }

    #[test]
    fn test_admin_path_with_user_role() {
        let policy = default_policy();

        // USER 역할로 ADMIN 경로 접근 → 403 (401이 아님)
        assert_eq!(
            policy.decide(
                &Method::GET,
                "/api/v1/admin/reports",
                &user_principal(Role::User)
            ),
            Decision::Forbidden
        );

        // ADMIN 역할은 허용
        assert_eq!(
            policy.decide(
                &Method::GET,
                "/api/v1/admin/reports",
                &user_principal(Role::Admin)
            ),
            Decision::Permit
        );

        // 익명은 401
        assert_eq!(
            policy.decide(&Method::GET, "/api/v1/admin/reports", &Principal::Anonymous),
            Decision::RequireAuth
        );
    }

    #[test]
    fn test_unmatched_defaults_to_authenticated() {
        let policy = default_policy();

        assert_eq!(
            policy.decide(&Method::POST, "/api/v1/reports", &Principal::Anonymous),
            Decision::RequireAuth
        );
        assert_eq!(
            policy.decide(
                &Method::POST,
                "/api/v1/reports",
                &user_principal(Role::User)
            ),
            Decision::Permit
        );
    }

    #[test]
    fn test_nickname_exists_pattern() {
        let policy = default_policy();

        assert_eq!(
            policy.decide(
                &Method::GET,
                "/api/v1/users/nickname/길잡이/exists",
                &Principal::Anonymous
            ),
            Decision::Permit
        );
        // 닉네임 세그먼트가 빠진 경로는 일치하지 않음
        assert_eq!(
            policy.decide(
                &Method::GET,
                "/api/v1/users/nickname/exists",
                &Principal::Anonymous
            ),
            Decision::RequireAuth
        );
    }
}
