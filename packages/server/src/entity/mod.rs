pub mod contest;
pub mod contest_participant;
pub mod contest_problem;
pub mod submission_record;
