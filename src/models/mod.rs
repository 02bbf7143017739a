pub mod task;
pub mod user;

pub use task::{CompletedInput, NewTask, Task, TaskPriority, TaskUpdate};
pub use user::{
    AuthResponse, ChangePasswordRequest, LoginRequest, PublicUser, RegisterRequest,
    UpdateProfileRequest, User,
};
