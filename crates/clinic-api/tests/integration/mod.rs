mod accounts;
mod booking;
mod content;
mod queue;
