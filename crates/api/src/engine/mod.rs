pub mod waitlist_queue;
