pub mod user_repo;
pub use user_repo::UserRepository;
pub mod business_repo;
pub use business_repo::BusinessRepository;
pub mod department_repo;
pub use department_repo::DepartmentRepository;
pub mod access_repo;
pub use access_repo::AccessRepository;
pub mod manual_repo;
pub use manual_repo::ManualRepository;
pub mod quiz_repo;
pub use quiz_repo::QuizRepository;
