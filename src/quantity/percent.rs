quantity!(Percent, u8, "%");
