use crate::{entry::ArchiveEntry, Directory, DirectoryFileEntry, MAGIC_NUMBER};
use anyhow::{anyhow, bail, Context, Result};
use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write},
    path::Path,
};

const START: u64 = 20;

/// The archive codec seen by the orchestrator.
pub trait Codec {
    /// Every entry of the archive at `path`, in stored order.
    fn decode(&self, path: &Path) -> Result<Vec<ArchiveEntry>>;
    /// Writes a new archive at `path` holding `entries` in order.
    fn encode(&self, path: &Path, entries: &[ArchiveEntry]) -> Result<()>;
}

pub struct Archive<I> {
    inner: I,
    directory: Directory,
    pos: u64,
}

impl<R: Read + Seek> Archive<R> {
    pub fn open(mut r: R) -> Result<Self> {
        let magic = r.read_u64::<BigEndian>().context("Couldn't read header")?;
        if magic != MAGIC_NUMBER {
            bail!("Not an archive (bad magic {magic:#018x})");
        }
        let dir_pos = r.read_u64::<LittleEndian>()?;
        let dir_len = r.read_u32::<LittleEndian>()?;

        let end = r.seek(SeekFrom::End(0))?;
        if dir_pos < START || dir_pos.checked_add(dir_len as u64).map_or(true, |e| e > end) {
            bail!("Directory out of bounds ({dir_len} bytes at {dir_pos}, archive is {end} bytes)");
        }
        r.seek(SeekFrom::Start(dir_pos))?;
        let mut buf = vec![0u8; dir_len as usize];
        r.read_exact(&mut buf)?;
        let directory = decode_directory(&mut buf.as_slice())?;

        for e in directory.file_entries.iter() {
            if e.offset < START || e.offset.checked_add(e.len).map_or(true, |end| end > dir_pos) {
                bail!("Entry out of bounds: [{}]", e.name);
            }
        }

        Ok(Self {
            inner: r,
            directory,
            pos: START,
        })
    }

    pub fn read_entry(&mut self, entry_id: u32) -> Result<ArchiveEntry> {
        let e = self
            .directory
            .file_entries
            .get(entry_id as usize)
            .ok_or(anyhow!("Entry doesn't exist"))?;
        self.inner.seek(SeekFrom::Start(e.offset))?;
        let mut payload = vec![0u8; e.len as usize];
        self.inner
            .read_exact(&mut payload)
            .with_context(|| format!("Couldn't read entry: [{}]", e.name))?;
        self.pos = e.offset + e.len;
        if crc32fast::hash(&payload) != e.checksum {
            bail!("Checksum mismatch: [{}]", e.name);
        }
        Ok(ArchiveEntry::new(e.name.clone(), payload))
    }

    pub fn entries(&mut self) -> Result<Vec<ArchiveEntry>> {
        (0..self.directory.file_entries.len() as u32)
            .map(|id| self.read_entry(id))
            .collect()
    }
}

impl<W: Write + Seek> Archive<W> {
    pub fn new(mut w: W) -> Result<Self> {
        w.write_u64::<BigEndian>(MAGIC_NUMBER)?;
        w.write_u64::<LittleEndian>(0)?;
        w.write_u32::<LittleEndian>(0)?;
        Ok(Self {
            inner: w,
            directory: Directory::default(),
            pos: START,
        })
    }

    pub fn append_entry(&mut self, name: &str, payload: &[u8]) -> Result<u32> {
        if name.len() > u16::MAX as usize {
            bail!("Entry name too long: [{name}]");
        }
        if self.directory.file_entries.len() >= u32::MAX as usize {
            bail!("Too many entries");
        }
        self.inner.write_all(payload)?;
        self.directory.file_entries.push(DirectoryFileEntry {
            name: name.to_string(),
            offset: self.pos,
            len: payload.len() as u64,
            checksum: crc32fast::hash(payload),
        });
        self.pos += payload.len() as u64;
        Ok(self.directory.file_entries.len() as u32 - 1)
    }

    pub fn finalize(mut self) -> Result<(W, Directory)> {
        let mut dir_buf = Vec::new();
        encode_directory(&self.directory, &mut dir_buf)?;
        let dir_len = u32::try_from(dir_buf.len()).context("Directory too large")?;
        let dir_pos = self.pos;

        self.inner.write_all(&dir_buf)?;
        self.inner.seek(SeekFrom::Start(0))?;
        self.inner.write_u64::<BigEndian>(MAGIC_NUMBER)?;
        self.inner.write_u64::<LittleEndian>(dir_pos)?;
        self.inner.write_u32::<LittleEndian>(dir_len)?;
        self.inner.flush()?;
        Ok((self.inner, self.directory))
    }
}

impl<I> Archive<I> {
    pub fn directory(&self) -> &Directory {
        &self.directory
    }
    pub fn into_directory(self) -> Directory {
        self.directory
    }
}

fn encode_directory<W: Write>(dir: &Directory, w: &mut W) -> Result<()> {
    w.write_u32::<LittleEndian>(dir.file_entries.len() as u32)?;
    for e in dir.file_entries.iter() {
        w.write_u16::<LittleEndian>(e.name.len() as u16)?;
        w.write_all(e.name.as_bytes())?;
        w.write_u64::<LittleEndian>(e.offset)?;
        w.write_u64::<LittleEndian>(e.len)?;
        w.write_u32::<LittleEndian>(e.checksum)?;
    }
    Ok(())
}

fn decode_directory<R: Read>(r: &mut R) -> Result<Directory> {
    let count = r.read_u32::<LittleEndian>().context("Truncated directory")?;
    let mut file_entries = Vec::new();
    for i in 0..count {
        let name_len = r
            .read_u16::<LittleEndian>()
            .with_context(|| format!("Truncated directory at entry {i}"))?;
        let mut name = vec![0u8; name_len as usize];
        r.read_exact(&mut name)
            .with_context(|| format!("Truncated directory at entry {i}"))?;
        let name = String::from_utf8(name).with_context(|| format!("Entry {i} name isn't UTF-8"))?;
        let offset = r.read_u64::<LittleEndian>()?;
        let len = r.read_u64::<LittleEndian>()?;
        let checksum = r.read_u32::<LittleEndian>()?;
        file_entries.push(DirectoryFileEntry {
            name,
            offset,
            len,
            checksum,
        });
    }
    Ok(Directory { file_entries })
}

/// The `.ftg` container on disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FtgCodec;

impl FtgCodec {
    /// Directory of the archive at `path`, without reading any payload.
    pub fn index(&self, path: &Path) -> Result<Directory> {
        let f = File::open(path).with_context(|| format!("Couldn't open {}", path.display()))?;
        Ok(Archive::open(BufReader::new(f))?.into_directory())
    }
}

impl Codec for FtgCodec {
    fn decode(&self, path: &Path) -> Result<Vec<ArchiveEntry>> {
        let f = File::open(path).with_context(|| format!("Couldn't open {}", path.display()))?;
        Archive::open(BufReader::new(f))
            .and_then(|mut archive| archive.entries())
            .with_context(|| format!("Couldn't decode {}", path.display()))
    }

    fn encode(&self, path: &Path, entries: &[ArchiveEntry]) -> Result<()> {
        let f = File::create(path).with_context(|| format!("Couldn't create {}", path.display()))?;
        let written = Archive::new(BufWriter::new(f)).and_then(|mut archive| {
            for entry in entries {
                archive.append_entry(&entry.relative_path, &entry.payload)?;
            }
            archive.finalize()
        });
        if let Err(err) = written {
            let _ = fs::remove_file(path);
            return Err(err.context(format!("Couldn't encode {}", path.display())));
        }
        Ok(())
    }
}
