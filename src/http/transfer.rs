//! File-to-socket body transfer.
//!
//! On Linux the bytes go through `sendfile(2)` so they never pass through a
//! user-space buffer. Everywhere else, and whenever the kernel refuses the
//! descriptor pair, a buffered copy is used instead.

use std::io::{self, SeekFrom};

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWrite};
use tokio::net::TcpStream;

/// Largest span handed to a single `sendfile` call.
#[cfg(target_os = "linux")]
const SENDFILE_CHUNK: u64 = 1 << 20;

/// Sends `start..end` of `file` to `stream`.
///
/// Returns the number of body bytes written. A short count means the file
/// shrank underneath us; the caller must not try to resend anything.
pub async fn send_range(stream: &mut TcpStream, file: &mut File, start: u64, end: u64) -> io::Result<u64> {
    if start >= end {
        return Ok(0);
    }

    #[cfg(target_os = "linux")]
    {
        let (sent, res) = sendfile(stream, file, start, end).await;
        match res {
            Ok(()) => return Ok(sent),
            Err(e) if sendfile_unsupported(&e) => {
                tracing::debug!(error = %e, sent, "sendfile unavailable, falling back to copy");
                return resume_with_copy(file, stream, start, sent, end).await;
            }
            Err(e) => return Err(e),
        }
    }

    #[cfg(not(target_os = "linux"))]
    copy_range(file, stream, start, end).await
}

/// Copies whatever part of `start..end` is left after `sent` bytes already
/// went out, and returns the total sent.
pub async fn resume_with_copy<W>(file: &mut File, writer: &mut W, start: u64, sent: u64, end: u64) -> io::Result<u64>
where
    W: AsyncWrite + Unpin,
{
    let copied = copy_range(file, writer, start + sent, end).await?;
    Ok(sent + copied)
}

/// Buffered copy of `start..end` of `file` into `writer`.
pub async fn copy_range<W>(file: &mut File, writer: &mut W, start: u64, end: u64) -> io::Result<u64>
where
    W: AsyncWrite + Unpin,
{
    if start >= end {
        return Ok(0);
    }

    file.seek(SeekFrom::Start(start)).await?;
    let mut limited = (&mut *file).take(end - start);
    tokio::io::copy(&mut limited, writer).await
}

#[cfg(target_os = "linux")]
fn sendfile_unsupported(e: &io::Error) -> bool {
    matches!(e.raw_os_error(), Some(libc::EINVAL) | Some(libc::ENOSYS))
}

/// Returns the bytes sent together with the outcome, so a failure part way
/// through still reports how far the body got.
#[cfg(target_os = "linux")]
async fn sendfile(stream: &TcpStream, file: &File, start: u64, end: u64) -> (u64, io::Result<()>) {
    use std::os::unix::io::AsRawFd;
    use tokio::io::Interest;

    let (Ok(mut offset), Ok(end)) = (to_off_t(start), to_off_t(end)) else {
        return (0, Err(io::Error::new(io::ErrorKind::InvalidInput, "offset out of range")));
    };
    let first = offset;
    let out_fd = stream.as_raw_fd();
    let in_fd = file.as_raw_fd();

    let res = loop {
        if offset >= end {
            break Ok(());
        }
        if let Err(e) = stream.writable().await {
            break Err(e);
        }

        let count = (end - offset).min(SENDFILE_CHUNK as libc::off_t) as usize;
        let res = stream.try_io(Interest::WRITABLE, || {
            // SAFETY: both descriptors stay open for the whole call and
            // `offset` is an exclusively borrowed off_t.
            let n = unsafe { libc::sendfile(out_fd, in_fd, &mut offset, count) };
            if n < 0 {
                Err(io::Error::last_os_error())
            } else {
                Ok(n as usize)
            }
        });

        match res {
            // File ended early
            Ok(0) => break Ok(()),
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => continue,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => break Err(e),
        }
    };

    ((offset - first) as u64, res)
}

#[cfg(target_os = "linux")]
fn to_off_t(v: u64) -> Result<libc::off_t, std::num::TryFromIntError> {
    libc::off_t::try_from(v)
}
