//! 저장소 접근 계층.
//!
//! PostgreSQL에 대한 데이터 접근을 담당합니다. 각 Repository는 상태 없는
//! 구조체이며, 모든 연산은 `&PgPool`을 받아 요청 단위 트랜잭션으로
//! 수행됩니다. 동시성 제어는 저장소에 위임합니다.

pub mod boards;
pub mod categories;
pub mod comments;
pub mod edit_requests;
pub mod reports;
pub mod users;

pub use boards::{
    BoardListItem, BoardRecord, BoardRepository, BoardSortType, BoardStatus, NewBoard, UpdateBoard,
};
pub use categories::{CategoryRecord, CategoryRepository};
pub use comments::{CommentRepository, CommentWithWriter, NewComment};
pub use edit_requests::{EditRequestRecord, EditRequestRepository, NewEditRequest};
pub use reports::{NewReport, ReportRepository, ReportType, ReportWithBoard};
pub use users::{UserRecord, UserRepository};
