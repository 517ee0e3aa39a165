pub mod schedule_event;
