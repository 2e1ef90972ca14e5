use std::fmt;

/// Which protocols an ACL allows; the three flags are independent.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Permissions {
    pub cifs: bool,
    pub ftp: bool,
    pub nfs: bool,
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "cifs={}, ftp={}, nfs={}",
            self.cifs, self.ftp, self.nfs
        )
    }
}
