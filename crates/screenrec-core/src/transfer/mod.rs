mod cancellable;
mod share;

pub use {
    cancellable::{
        CancellableTransfer, TransferJob, TransferMonitor, TransferResult, TransferRunner,
        INTERRUPTED_EXIT_CODE,
    },
    share::{ShareFlow, ShareOutcome, ShareSettings, UploadBackend},
};
