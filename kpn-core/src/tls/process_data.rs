use super::*;

// This is the TLS data for a process. It is set by the process thread when it starts
// and is read by the channels, so that a blocking get or put can be attributed to
// the process making it. A thread which isn't a process, such as the directing thread
// or a test, has no process id.

thread_local! {
    #[allow(non_upper_case_globals)]
    pub static tls_process_data: RefCell<ProcessData> = RefCell::new(ProcessData::default());
}

#[derive(Debug, Default, Clone)]
pub struct ProcessData {
    pub id: Option<ProcessId>,
    pub name: Option<Arc<str>>,
}
impl ProcessData {
    // the process running on this thread, if any
    pub fn current() -> Option<ProcessId> { tls_process_data.with(|t| t.borrow().id) }

    // the name of the process running on this thread, if any
    pub fn current_name() -> Option<Arc<str>> { tls_process_data.with(|t| t.borrow().name.clone()) }

    // called by the process thread as it starts
    pub fn enter(id: ProcessId, name: Arc<str>) {
        tls_process_data.with(|t| {
            let mut tls = t.borrow_mut();
            tls.id = Some(id);
            tls.name = Some(name);
        });
    }

    // called by the process thread as it finishes
    pub fn leave() {
        tls_process_data.with(|t| {
            let mut tls = t.borrow_mut();
            tls.id = None;
            tls.name = None;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_entering_thread_sees_the_process() {
        ProcessData::enter(ProcessId(4), Arc::from("p4"));
        assert_eq!(ProcessData::current(), Some(ProcessId(4)));
        let other = thread::spawn(ProcessData::current).join().unwrap();
        assert_eq!(other, None);
        ProcessData::leave();
        assert_eq!(ProcessData::current(), None);
        assert!(ProcessData::current_name().is_none());
    }
}
