//! Host callbacks.
//!
//! These traits abstract over what the engine reports outward:
//! - Hashtags found during a reconciliation pass
//! - Buffer mutations, for persistence and other observers
//!
//! Implementations are provided by the host (the note store, a test, the CLI).

use smol_str::SmolStr;

use crate::types::EditInfo;

/// Receives hashtag names detected by a reconciliation pass.
///
/// Called once per distinct name per pass, in order of first appearance.
/// Names come without the leading `#`. Fire and forget: the engine never
/// removes tags, that is the store's business.
pub trait HashtagSink {
    fn on_hashtag_detected(&mut self, tag: &str);
}

/// Unit type implementation - tags are dropped.
impl HashtagSink for () {
    fn on_hashtag_detected(&mut self, _tag: &str) {}
}

/// Collects every reported tag.
impl HashtagSink for Vec<SmolStr> {
    fn on_hashtag_detected(&mut self, tag: &str) {
        self.push(SmolStr::new(tag));
    }
}

impl<T: HashtagSink> HashtagSink for &mut T {
    fn on_hashtag_detected(&mut self, tag: &str) {
        (**self).on_hashtag_detected(tag)
    }
}

impl<T: HashtagSink> HashtagSink for Option<T> {
    fn on_hashtag_detected(&mut self, tag: &str) {
        if let Some(sink) = self {
            sink.on_hashtag_detected(tag);
        }
    }
}

/// Adapts a closure into a sink or observer.
pub struct FnSink<F>(pub F);

impl<F: FnMut(&str)> HashtagSink for FnSink<F> {
    fn on_hashtag_detected(&mut self, tag: &str) {
        (self.0)(tag)
    }
}

/// Notified after every buffer mutation, before the reconciliation pass
/// that follows it.
pub trait MutationObserver {
    fn on_mutation(&mut self, edit: &EditInfo);
}

impl MutationObserver for () {
    fn on_mutation(&mut self, _edit: &EditInfo) {}
}

/// Records every mutation.
impl MutationObserver for Vec<EditInfo> {
    fn on_mutation(&mut self, edit: &EditInfo) {
        self.push(edit.clone());
    }
}

impl<T: MutationObserver + ?Sized> MutationObserver for Box<T> {
    fn on_mutation(&mut self, edit: &EditInfo) {
        (**self).on_mutation(edit)
    }
}

impl<F: FnMut(&EditInfo)> MutationObserver for FnSink<F> {
    fn on_mutation(&mut self, edit: &EditInfo) {
        (self.0)(edit)
    }
}
