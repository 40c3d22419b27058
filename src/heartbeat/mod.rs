mod scheduler;

pub use scheduler::HeartbeatScheduler;
