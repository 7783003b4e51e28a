//! 역할 기반 접근 제어 (RBAC) 및 요청 주체.
//!
//! 사용자 역할, 권한, 그리고 요청마다 재구성되는 Principal 정의.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 사용자 역할.
///
/// 시스템에서 사용자의 권한 수준을 정의합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// 관리자 - 모든 권한 보유
    Admin,
    /// 일반 사용자 - 글 작성/신고/수정요청 권한
    User,
}

impl Role {
    /// 역할이 특정 권한을 가지는지 확인.
    pub fn has_permission(&self, permission: Permission) -> bool {
        match self {
            Role::Admin => true, // Admin은 모든 권한 보유
            Role::User => matches!(
                permission,
                Permission::WriteBoard
                    | Permission::WriteComment
                    | Permission::ReportBoard
                    | Permission::RequestEdit
            ),
        }
    }

    /// 역할의 우선순위 레벨 반환 (높을수록 더 많은 권한).
    pub fn level(&self) -> u8 {
        match self {
            Role::Admin => 100,
            Role::User => 10,
        }
    }

    /// 문자열에서 역할 파싱.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "user" => Some(Role::User),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::Admin => "admin",
            Role::User => "user",
        };
        write!(f, "{}", s)
    }
}

/// 시스템 권한.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// 게시글 작성/수정
    WriteBoard,
    /// 댓글 작성
    WriteComment,
    /// 게시글 신고
    ReportBoard,
    /// 게시글 수정요청 제출
    RequestEdit,
    /// 게시글 승인/반려
    ApproveBoards,
    /// 신고 처리
    ManageReports,
    /// 카테고리 관리
    ManageCategories,
    /// 사용자 관리
    ManageUsers,
}

/// 요청 주체.
///
/// 토큰 검증 결과로 요청마다 새로 만들어지며, 요청 처리 후 버려집니다.
/// 인증 미들웨어가 request extensions에 넣어 핸들러에 전달합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    /// 인증되지 않은 요청 (토큰 없음 또는 검증 실패)
    Anonymous,
    /// 인증된 사용자
    User {
        /// 사용자 PK
        pk: Uuid,
        /// 닉네임
        nickname: String,
        /// 역할
        role: Role,
    },
}

impl Principal {
    /// 익명 여부 확인.
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Principal::Anonymous)
    }

    /// 역할 반환 (익명이면 None).
    pub fn role(&self) -> Option<Role> {
        match self {
            Principal::Anonymous => None,
            Principal::User { role, .. } => Some(*role),
        }
    }

    /// 특정 역할 이상인지 확인.
    pub fn has_role(&self, required: Role) -> bool {
        self.role()
            .map(|r| r.level() >= required.level())
            .unwrap_or(false)
    }

    /// 사용자 PK 반환 (익명이면 None).
    pub fn pk(&self) -> Option<Uuid> {
        match self {
            Principal::Anonymous => None,
            Principal::User { pk, .. } => Some(*pk),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_permissions() {
        // Admin은 모든 권한 보유
        assert!(Role::Admin.has_permission(Permission::ManageUsers));
        assert!(Role::Admin.has_permission(Permission::ApproveBoards));
        assert!(Role::Admin.has_permission(Permission::WriteBoard));

        // User는 작성/신고/수정요청만
        assert!(Role::User.has_permission(Permission::WriteBoard));
        assert!(Role::User.has_permission(Permission::ReportBoard));
        assert!(!Role::User.has_permission(Permission::ApproveBoards));
        assert!(!Role::User.has_permission(Permission::ManageReports));
    }

    #[test]
    fn test_role_level() {
        assert!(Role::Admin.level() > Role::User.level());
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("USER"), Some(Role::User));
        assert_eq!(Role::parse("unknown"), None);
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&Role::Admin).unwrap();
        assert_eq!(json, "\"admin\"");

        let parsed: Role = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Role::Admin);
    }

    #[test]
    fn test_principal_anonymous() {
        let principal = Principal::Anonymous;
        assert!(principal.is_anonymous());
        assert!(principal.role().is_none());
        assert!(principal.pk().is_none());
        assert!(!principal.has_role(Role::User));
    }

    #[test]
    fn test_principal_has_role() {
        let admin = Principal::User {
            pk: Uuid::new_v4(),
            nickname: "관리자".to_string(),
            role: Role::Admin,
        };
        let user = Principal::User {
            pk: Uuid::new_v4(),
            nickname: "유저".to_string(),
            role: Role::User,
        };

        // Admin은 User 요구 경로에도 접근 가능
        assert!(admin.has_role(Role::User));
        assert!(admin.has_role(Role::Admin));
        assert!(user.has_role(Role::User));
        assert!(!user.has_role(Role::Admin));
    }
}
