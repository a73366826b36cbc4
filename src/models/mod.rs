//! Data models for the library administration API

pub mod book;
pub mod borrowing;
pub mod category;
pub mod permission;
pub mod refs;
pub mod role;
pub mod user;

// Re-export commonly used types
pub use book::{Book, CreateBook, UpdateBook};
pub use borrowing::{BorrowStatus, Borrowing, BorrowingState, CreateBorrowing, ReturnBorrowing};
pub use category::{Category, CreateCategory, UpdateCategory};
pub use permission::{group_by_category, CreatePermission, Permission, UpdatePermission};
pub use refs::{EntityRef, PermissionSummary, RoleSummary};
pub use role::{AssignPermissions, CreateRole, Role, UpdateRole};
pub use user::{CreateUser, CurrentUser, RoleAssignment, RoleChange, RoleDiff, UpdateUser, User};
